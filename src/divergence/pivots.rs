//! Local extremum (pivot) scan over a close-price series

use serde::{Deserialize, Serialize};

/// Which side of its window a pivot sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    Low,
    High,
    /// Minimum and maximum of its window at once (flat segment)
    Flat,
}

/// A price pivot together with the oscillator value at the same index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub oscillator: Option<f64>,
    pub kind: PivotKind,
}

/// Scan `closes` for pivots using a symmetric window of half-width `lookback`.
///
/// Only indices with a full window on both sides are evaluated, so a series
/// shorter than `2 * lookback + 1` yields nothing. Every index equal to the
/// minimum or maximum of its window is recorded, including ties: a flat run
/// produces one pivot per interior index.
pub fn find_pivots(closes: &[f64], oscillator: &[Option<f64>], lookback: usize) -> Vec<Pivot> {
    let n = closes.len();
    let mut pivots = Vec::new();

    for i in lookback..n.saturating_sub(lookback) {
        let window = &closes[i - lookback..=i + lookback];
        let low = window.iter().copied().fold(f64::INFINITY, f64::min);
        let high = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let price = closes[i];
        let kind = match (price == low, price == high) {
            (true, true) => PivotKind::Flat,
            (true, false) => PivotKind::Low,
            (false, true) => PivotKind::High,
            (false, false) => continue,
        };

        pivots.push(Pivot {
            index: i,
            price,
            oscillator: oscillator.get(i).copied().flatten(),
            kind,
        });
    }

    pivots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_osc(n: usize) -> Vec<Option<f64>> {
        vec![None; n]
    }

    #[test]
    fn finds_trough_and_peak() {
        let closes = [3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0];
        let pivots = find_pivots(&closes, &no_osc(closes.len()), 2);

        let found: Vec<(usize, PivotKind)> = pivots.iter().map(|p| (p.index, p.kind)).collect();
        assert_eq!(found, vec![(2, PivotKind::Low)]);

        let pivots = find_pivots(&closes, &no_osc(closes.len()), 1);
        let found: Vec<(usize, PivotKind)> = pivots.iter().map(|p| (p.index, p.kind)).collect();
        assert_eq!(found, vec![(2, PivotKind::Low), (5, PivotKind::High)]);
    }

    #[test]
    fn boundaries_are_never_pivots() {
        // The global minimum sits at index 0 and the maximum at the end
        let closes = [0.0, 5.0, 4.0, 5.0, 9.0];
        let pivots = find_pivots(&closes, &no_osc(closes.len()), 1);
        assert!(pivots.iter().all(|p| p.index >= 1 && p.index < closes.len() - 1));
        let found: Vec<(usize, PivotKind)> = pivots.iter().map(|p| (p.index, p.kind)).collect();
        assert_eq!(found, vec![(1, PivotKind::High), (2, PivotKind::Low)]);
    }

    #[test]
    fn short_series_has_no_pivots() {
        let closes = [1.0, 0.0, 1.0, 2.0];
        assert!(find_pivots(&closes, &no_osc(4), 2).is_empty());
        assert!(find_pivots(&[], &[], 5).is_empty());
    }

    #[test]
    fn flat_run_records_every_interior_index() {
        let closes = [7.0; 6];
        let pivots = find_pivots(&closes, &no_osc(6), 1);
        let indices: Vec<usize> = pivots.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(pivots.iter().all(|p| p.kind == PivotKind::Flat));
    }

    #[test]
    fn tied_extremes_are_each_recorded() {
        let closes = [5.0, 1.0, 1.0, 5.0];
        let pivots = find_pivots(&closes, &no_osc(4), 1);
        let indices: Vec<usize> = pivots.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn oscillator_is_aligned_by_index() {
        let closes = [3.0, 1.0, 3.0];
        let osc = [Some(10.0), Some(20.0), Some(30.0)];
        let pivots = find_pivots(&closes, &osc, 1);
        assert_eq!(pivots[0].oscillator, Some(20.0));

        // A short oscillator slice reads as undefined instead of panicking
        let pivots = find_pivots(&closes, &osc[..1], 1);
        assert_eq!(pivots[0].oscillator, None);
    }
}
