//! Relative Strength Index over a simple moving average of gains and losses
//!
//! This is the "Cutler" flavour of RSI: plain rolling means, no Wilder
//! smoothing, so every value depends only on the trailing `period` deltas.

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`.
///
/// The output has the same length as the input and is index aligned with it.
/// Entry `i` is `None` while fewer than `period` deltas are available
/// (`i < period`), and also when the window saw no movement at all
/// (average gain and average loss both zero). A window with gains but no
/// losses saturates at 100.
pub fn compute_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut rsi = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        tracing::debug!(
            candle_count = closes.len(),
            required = period.saturating_add(1),
            "RSI: Not enough candles"
        );
        return rsi;
    }

    // gains[i] / losses[i] describe the move from closes[i - 1] to closes[i]
    let mut gains = vec![0.0; closes.len()];
    let mut losses = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let window = period as f64;
    for i in period..closes.len() {
        let start = i + 1 - period;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / window;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / window;
        rsi[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    rsi
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None; // No movement
        }
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
