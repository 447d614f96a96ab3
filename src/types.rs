//! Core types used throughout DivBot
//!
//! Defines candle intervals, price points and divergence signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kline intervals accepted by the Binance futures API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Min15
    }
}

impl Timeframe {
    /// Interval string used by the exchange (e.g., "15m")
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min3 => "3m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Min30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour8 => "8h",
            Timeframe::Hour12 => "12h",
            Timeframe::Day1 => "1d",
            Timeframe::Day3 => "3d",
            Timeframe::Week1 => "1w",
            Timeframe::Month1 => "1M",
        }
    }

    /// Parse from string
    ///
    /// Case matters only for the month interval: "1M" is a month, "1m" a minute.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "1M" {
            return Some(Timeframe::Month1);
        }
        match s.to_lowercase().as_str() {
            "1m" | "1min" => Some(Timeframe::Min1),
            "3m" => Some(Timeframe::Min3),
            "5m" => Some(Timeframe::Min5),
            "15m" | "15min" => Some(Timeframe::Min15),
            "30m" => Some(Timeframe::Min30),
            "1h" | "1hour" => Some(Timeframe::Hour1),
            "2h" => Some(Timeframe::Hour2),
            "4h" => Some(Timeframe::Hour4),
            "6h" => Some(Timeframe::Hour6),
            "8h" => Some(Timeframe::Hour8),
            "12h" => Some(Timeframe::Hour12),
            "1d" => Some(Timeframe::Day1),
            "3d" => Some(Timeframe::Day3),
            "1w" => Some(Timeframe::Week1),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One closed (or forming) candle reduced to what the detector needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Candle open time
    pub timestamp: DateTime<Utc>,
    /// Close price
    pub close: f64,
}

/// Extract close prices from a chronological series
pub fn close_prices(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// Outcome of one divergence evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivergenceSignal {
    /// Lower price pivot with a higher oscillator pivot
    Bullish,
    /// Higher price pivot with a lower oscillator pivot
    Bearish,
    NoSignal,
}

impl Default for DivergenceSignal {
    fn default() -> Self {
        DivergenceSignal::NoSignal
    }
}

impl DivergenceSignal {
    pub fn is_signal(&self) -> bool {
        !matches!(self, DivergenceSignal::NoSignal)
    }

    /// Operator-facing label used in alert messages
    pub fn label(&self) -> &'static str {
        match self {
            DivergenceSignal::Bullish => "📈 Bullish Divergence",
            DivergenceSignal::Bearish => "📉 Bearish Divergence",
            DivergenceSignal::NoSignal => "No divergence",
        }
    }
}

impl fmt::Display for DivergenceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivergenceSignal::Bullish => write!(f, "BULLISH"),
            DivergenceSignal::Bearish => write!(f, "BEARISH"),
            DivergenceSignal::NoSignal => write!(f, "NONE"),
        }
    }
}
