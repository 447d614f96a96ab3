//! Pivot-based RSI divergence detection
//!
//! Price pivots are paired with the oscillator value at the same candle and
//! the two most recent pivots are compared: price and oscillator moving in
//! opposite directions is a divergence. The kind of the pivots (high/low) is
//! deliberately not taken into account.

mod pivots;

pub use pivots::{find_pivots, Pivot, PivotKind};

use serde::{Deserialize, Serialize};

use crate::indicators::{compute_rsi, DEFAULT_RSI_PERIOD};
use crate::types::{close_prices, DivergenceSignal, PricePoint};

pub const DEFAULT_PIVOT_LOOKBACK: usize = 5;

/// The two most recent pivots of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPair {
    pub previous: Pivot,
    pub latest: Pivot,
}

/// Result of one detection pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub signal: DivergenceSignal,
    /// `None` when fewer than two pivots were found
    pub pair: Option<PivotPair>,
}

impl DivergenceReport {
    fn insufficient() -> Self {
        Self {
            signal: DivergenceSignal::NoSignal,
            pair: None,
        }
    }
}

/// Compare two pivots in order of occurrence.
///
/// An undefined oscillator value on either side never produces a signal.
pub fn classify(previous: &Pivot, latest: &Pivot) -> DivergenceSignal {
    let (r1, r2) = match (previous.oscillator, latest.oscillator) {
        (Some(r1), Some(r2)) => (r1, r2),
        _ => return DivergenceSignal::NoSignal,
    };
    let (p1, p2) = (previous.price, latest.price);

    if p2 < p1 && r2 > r1 {
        DivergenceSignal::Bullish
    } else if p2 > p1 && r2 < r1 {
        DivergenceSignal::Bearish
    } else {
        DivergenceSignal::NoSignal
    }
}

/// Find pivots in `closes` and classify the last two against `oscillator`.
pub fn detect_divergence(
    closes: &[f64],
    oscillator: &[Option<f64>],
    lookback: usize,
) -> DivergenceReport {
    let pivots = find_pivots(closes, oscillator, lookback);
    let [.., previous, latest] = pivots.as_slice() else {
        return DivergenceReport::insufficient();
    };

    DivergenceReport {
        signal: classify(previous, latest),
        pair: Some(PivotPair {
            previous: *previous,
            latest: *latest,
        }),
    }
}

/// RSI + divergence detection with fixed parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivergenceDetector {
    rsi_period: usize,
    lookback: usize,
}

impl Default for DivergenceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_RSI_PERIOD, DEFAULT_PIVOT_LOOKBACK)
    }
}

impl DivergenceDetector {
    pub fn new(rsi_period: usize, lookback: usize) -> Self {
        Self {
            rsi_period,
            lookback,
        }
    }

    pub fn rsi_period(&self) -> usize {
        self.rsi_period
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Evaluate a chronological candle series
    pub fn evaluate(&self, series: &[PricePoint]) -> DivergenceReport {
        let closes = close_prices(series);
        let rsi = compute_rsi(&closes, self.rsi_period);
        detect_divergence(&closes, &rsi, self.lookback)
    }
}
