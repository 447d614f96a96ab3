//! Alert delivery
//!
//! Alerts are best effort: a failed delivery is logged by the caller and has
//! no effect on detection.

mod telegram;

pub use telegram::{TelegramNotifier, DEFAULT_TELEGRAM_API_BASE};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::divergence::Pivot;
use crate::error::NotificationError;
use crate::types::{DivergenceSignal, Timeframe};

/// Trait for alert sinks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the sink name
    fn name(&self) -> &'static str;

    /// Deliver one plain-text message
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

/// Fallback sink when no messaging credentials are configured
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        tracing::info!(alert = %message, "Telegram not configured, alert logged only");
        Ok(())
    }
}

/// A detected divergence ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub signal: DivergenceSignal,
    /// Open time of the newest candle in the evaluated series
    pub candle_time: DateTime<Utc>,
    pub pivot: Pivot,
    /// Open time of the candle at `pivot.index`
    pub pivot_time: DateTime<Utc>,
}

impl Alert {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} detected", self.signal.label())?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Interval: {}", self.timeframe)?;
        writeln!(f, "Time: {}", self.candle_time.format("%Y-%m-%d %H:%M:%S UTC"))?;
        write!(
            f,
            "Pivot: {} close={}",
            self.pivot_time.format("%Y-%m-%d %H:%M:%S UTC"),
            self.pivot.price
        )?;
        match self.pivot.oscillator {
            Some(rsi) => write!(f, " RSI={:.2}", rsi),
            None => Ok(()),
        }
    }
}
