//! Market data sources
//!
//! The monitor only needs closes per candle, so sources hand back
//! [`PricePoint`]s in chronological order.

mod binance;

pub use binance::{parse_klines, BinanceFuturesClient, DEFAULT_FUTURES_BASE_URL};

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{PricePoint, Timeframe};

/// Trait for candle sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the most recent `limit` candles, oldest first
    async fn fetch_closes(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PricePoint>, FetchError>;
}
