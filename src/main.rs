//! DivBot entry point
//!
//! Polls Binance futures candles and alerts on RSI divergences until Ctrl-C.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use divbot::config::AppConfig;
use divbot::market_data::BinanceFuturesClient;
use divbot::monitor::DivergenceMonitor;
use divbot::notify::{LogNotifier, Notifier, TelegramNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(config.logging.json);

    config.validate().context("Invalid configuration")?;
    info!("▶ RSI Divergence Bot starting: {}", config);

    let market = BinanceFuturesClient::new(
        config.exchange.base_url.clone(),
        Duration::from_secs(config.exchange.timeout_secs),
    )?;

    let notifier: Box<dyn Notifier> = match config.telegram_credentials() {
        Some((token, chat_id)) => Box::new(TelegramNotifier::new(
            config.telegram.api_base.clone(),
            token,
            chat_id,
            Duration::from_secs(config.telegram.timeout_secs),
        )?),
        None => {
            warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not set, alerts will only be logged");
            Box::new(LogNotifier)
        }
    };

    let monitor = DivergenceMonitor::new(
        config.monitor.symbol.clone(),
        config.timeframes()?,
        config.monitor.candle_limit,
        config.poll_interval(),
        config.detector(),
        Box::new(market),
        notifier,
    );

    monitor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                // Without a signal handler, keep running until killed
                std::future::pending::<()>().await;
            }
            info!("Ctrl-C received, shutting down");
        })
        .await;

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
