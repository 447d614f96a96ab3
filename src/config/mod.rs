//! Configuration management for DivBot
//!
//! Loads from YAML files + environment variables via .env

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::time::Duration;

use crate::divergence::{DivergenceDetector, DEFAULT_PIVOT_LOOKBACK};
use crate::indicators::DEFAULT_RSI_PERIOD;
use crate::market_data::DEFAULT_FUTURES_BASE_URL;
use crate::notify::DEFAULT_TELEGRAM_API_BASE;
use crate::types::Timeframe;

/// Binance rejects kline requests above this limit
const MAX_CANDLE_LIMIT: usize = 1500;

/// Plain environment variables from the original script, mapped to config keys
const LEGACY_ENV_KEYS: [(&str, &str); 8] = [
    ("SYMBOL", "monitor.symbol"),
    ("INTERVALS", "monitor.intervals"),
    ("POLL_SEC", "monitor.poll_secs"),
    ("RSI_PERIOD", "detector.rsi_period"),
    ("PIVOT_LOOKBACK", "detector.pivot_lookback"),
    ("BINANCE_FUTURES_BASE", "exchange.base_url"),
    ("TELEGRAM_TOKEN", "telegram.token"),
    ("TELEGRAM_CHAT_ID", "telegram.chat_id"),
];

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub detector: DetectorConfig,
    pub exchange: ExchangeConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Futures symbol to watch (e.g., BTCUSDT)
    pub symbol: String,
    /// Kline intervals evaluated each cycle (15m, 1h, ...)
    pub intervals: Vec<String>,
    /// Sleep between cycles in seconds
    pub poll_secs: u64,
    /// Candles fetched per interval
    pub candle_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// RSI period
    pub rsi_period: usize,
    /// Pivot half-window in candles
    pub pivot_lookback: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Binance futures REST endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub chat_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let legacy: Vec<(&str, String)> = LEGACY_ENV_KEYS
            .iter()
            .filter_map(|(var, key)| std::env::var(var).ok().map(|value| (*key, value)))
            .collect();

        Self::build(None, legacy)
    }

    /// `env` replaces the process environment for the `DIVBOT__*` layer when set
    fn build(env: Option<Map<String, String>>, overrides: Vec<(&str, String)>) -> Result<Self> {
        let mut builder = Config::builder()
            // Monitor defaults
            .set_default("monitor.symbol", "BTCUSDT")?
            .set_default("monitor.intervals", vec!["15m", "1h"])?
            .set_default("monitor.poll_secs", 60)?
            .set_default("monitor.candle_limit", 200)?
            // Detector defaults
            .set_default("detector.rsi_period", DEFAULT_RSI_PERIOD as u64)?
            .set_default("detector.pivot_lookback", DEFAULT_PIVOT_LOOKBACK as u64)?
            // Exchange defaults
            .set_default("exchange.base_url", DEFAULT_FUTURES_BASE_URL)?
            .set_default("exchange.timeout_secs", 30)?
            // Telegram defaults (no credentials: alerts go to the log)
            .set_default("telegram.api_base", DEFAULT_TELEGRAM_API_BASE)?
            .set_default("telegram.timeout_secs", 10)?
            // Logging defaults
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (DIVBOT__*)
            .add_source(
                Environment::with_prefix("DIVBOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("monitor.intervals")
                    .try_parsing(true)
                    .source(env),
            );

        for (key, value) in overrides {
            builder = if key == "monitor.intervals" {
                let list: Vec<String> = split_list(&value);
                builder.set_override(key, list)?
            } else {
                builder.set_override(key, value)?
            };
        }

        let config = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Check ranges and parse intervals; fails fast before the loop starts
    pub fn validate(&self) -> Result<()> {
        if self.monitor.symbol.trim().is_empty() {
            bail!("monitor.symbol must not be empty");
        }
        self.timeframes()?;
        if self.detector.rsi_period == 0 {
            bail!("detector.rsi_period must be at least 1");
        }
        if self.detector.pivot_lookback == 0 {
            bail!("detector.pivot_lookback must be at least 1");
        }
        if self.monitor.poll_secs == 0 {
            bail!("monitor.poll_secs must be at least 1");
        }
        if !(1..=MAX_CANDLE_LIMIT).contains(&self.monitor.candle_limit) {
            bail!(
                "monitor.candle_limit must be between 1 and {}, got {}",
                MAX_CANDLE_LIMIT,
                self.monitor.candle_limit
            );
        }
        Ok(())
    }

    /// Configured intervals as typed timeframes
    pub fn timeframes(&self) -> Result<Vec<Timeframe>> {
        if self.monitor.intervals.is_empty() {
            bail!("monitor.intervals must list at least one interval");
        }
        self.monitor
            .intervals
            .iter()
            .map(|s| {
                Timeframe::from_str(s).with_context(|| format!("Unsupported interval: {:?}", s))
            })
            .collect()
    }

    pub fn detector(&self) -> DivergenceDetector {
        DivergenceDetector::new(self.detector.rsi_period, self.detector.pivot_lookback)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.poll_secs)
    }

    /// Telegram credentials, when both are present and non-empty
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram.token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = self.telegram.chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some((token, chat_id))
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "symbol={} intervals={:?} rsi_period={} lookback={} poll={}s limit={} telegram={}",
            self.monitor.symbol,
            self.monitor.intervals,
            self.detector.rsi_period,
            self.detector.pivot_lookback,
            self.monitor.poll_secs,
            self.monitor.candle_limit,
            if self.telegram_credentials().is_some() {
                "on"
            } else {
                "off"
            }
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: Vec<(&str, String)>) -> Result<AppConfig> {
        AppConfig::build(Some(Map::new()), overrides)
    }

    fn defaults() -> AppConfig {
        build(Vec::new()).expect("defaults should deserialize")
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = defaults();
        assert_eq!(cfg.monitor.symbol, "BTCUSDT");
        assert_eq!(cfg.monitor.intervals, vec!["15m", "1h"]);
        assert_eq!(cfg.monitor.poll_secs, 60);
        assert_eq!(cfg.monitor.candle_limit, 200);
        assert_eq!(cfg.detector.rsi_period, 14);
        assert_eq!(cfg.detector.pivot_lookback, 5);
        assert_eq!(cfg.exchange.base_url, "https://fapi.binance.com");
        assert!(cfg.telegram_credentials().is_none());
        assert!(cfg.validate().is_ok());
        assert_eq!(
            cfg.timeframes().unwrap(),
            vec![Timeframe::Min15, Timeframe::Hour1]
        );
    }

    #[test]
    fn legacy_overrides_apply() {
        let cfg = build(vec![
            ("monitor.symbol", "ETHUSDT".to_string()),
            ("monitor.intervals", "5m, 4h".to_string()),
            ("detector.rsi_period", "7".to_string()),
            ("telegram.token", "123:abc".to_string()),
            ("telegram.chat_id", "42".to_string()),
        ])
        .expect("overrides should deserialize");

        assert_eq!(cfg.monitor.symbol, "ETHUSDT");
        assert_eq!(
            cfg.timeframes().unwrap(),
            vec![Timeframe::Min5, Timeframe::Hour4]
        );
        assert_eq!(cfg.detector.rsi_period, 7);
        assert_eq!(cfg.telegram_credentials(), Some(("123:abc", "42")));
    }

    #[test]
    fn prefixed_environment_layer_applies() {
        let env: Map<String, String> = [
            ("DIVBOT__MONITOR__INTERVALS", "5m,1h"),
            ("DIVBOT__MONITOR__POLL_SECS", "30"),
            ("DIVBOT__TELEGRAM__CHAT_ID", "-1001234"),
            ("UNRELATED__MONITOR__SYMBOL", "ETHUSDT"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cfg = AppConfig::build(Some(env), Vec::new()).expect("env layer should deserialize");
        assert_eq!(cfg.monitor.intervals, vec!["5m", "1h"]);
        assert_eq!(
            cfg.timeframes().unwrap(),
            vec![Timeframe::Min5, Timeframe::Hour1]
        );
        assert_eq!(cfg.monitor.poll_secs, 30);
        assert_eq!(cfg.telegram.chat_id.as_deref(), Some("-1001234"));
        assert_eq!(cfg.monitor.symbol, "BTCUSDT");
    }

    #[test]
    fn legacy_variables_override_prefixed_environment() {
        let env: Map<String, String> = [("DIVBOT__MONITOR__SYMBOL".to_string(), "ETHUSDT".to_string())]
            .into_iter()
            .collect();
        let cfg = AppConfig::build(Some(env), vec![("monitor.symbol", "SOLUSDT".to_string())])
            .expect("overrides should deserialize");
        assert_eq!(cfg.monitor.symbol, "SOLUSDT");
    }

    #[test]
    fn digest_hides_token() {
        let cfg = build(vec![
            ("telegram.token", "123:very-secret".to_string()),
            ("telegram.chat_id", "42".to_string()),
        ])
        .unwrap();
        let digest = cfg.digest();
        assert!(digest.contains("telegram=on"));
        assert!(!digest.contains("very-secret"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = defaults();
        cfg.monitor.intervals = vec!["15m".to_string(), "7m".to_string()];
        assert!(cfg.validate().is_err());

        let mut cfg = defaults();
        cfg.monitor.intervals.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = defaults();
        cfg.detector.pivot_lookback = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = defaults();
        cfg.monitor.candle_limit = 5000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_credentials_fall_back_to_log() {
        let mut cfg = defaults();
        cfg.telegram.token = Some(String::new());
        cfg.telegram.chat_id = Some("42".to_string());
        assert!(cfg.telegram_credentials().is_none());
    }
}
