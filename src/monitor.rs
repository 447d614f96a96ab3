//! Poll loop: fetch candles, evaluate divergence, send alerts
//!
//! Every cycle starts from scratch; nothing is carried between cycles, so the
//! same divergence is reported again on each poll while it stays the most
//! recent pivot pair.

use std::future::Future;
use std::time::Duration;

use crate::divergence::{DivergenceDetector, DivergenceReport};
use crate::market_data::MarketData;
use crate::notify::{Alert, Notifier};
use crate::types::{PricePoint, Timeframe};

/// What a single cycle did, for logging and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Timeframes whose candles were fetched and evaluated
    pub evaluated: usize,
    /// Timeframes skipped because the fetch failed
    pub failed: usize,
    pub alerts: Vec<Alert>,
}

pub struct DivergenceMonitor {
    symbol: String,
    timeframes: Vec<Timeframe>,
    candle_limit: usize,
    poll_interval: Duration,
    detector: DivergenceDetector,
    market: Box<dyn MarketData>,
    notifier: Box<dyn Notifier>,
}

impl DivergenceMonitor {
    pub fn new(
        symbol: impl Into<String>,
        timeframes: Vec<Timeframe>,
        candle_limit: usize,
        poll_interval: Duration,
        detector: DivergenceDetector,
        market: Box<dyn MarketData>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframes,
            candle_limit,
            poll_interval,
            detector,
            market,
            notifier,
        }
    }

    /// Run cycles until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            symbol = %self.symbol,
            timeframes = ?self.timeframes,
            source = self.market.name(),
            notifier = self.notifier.name(),
            poll_secs = self.poll_interval.as_secs(),
            "▶ Divergence monitor started"
        );

        loop {
            let report = self.run_cycle().await;
            tracing::debug!(
                evaluated = report.evaluated,
                failed = report.failed,
                alerts = report.alerts.len(),
                "Cycle finished"
            );

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!(symbol = %self.symbol, "⏹ Divergence monitor stopped");
    }

    /// Evaluate every configured timeframe once.
    ///
    /// A failed fetch skips only its own timeframe; a failed notification is
    /// logged and otherwise ignored.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for &timeframe in &self.timeframes {
            let series = match self
                .market
                .fetch_closes(&self.symbol, timeframe, self.candle_limit)
                .await
            {
                Ok(series) => series,
                Err(e) => {
                    tracing::warn!(
                        symbol = %self.symbol,
                        timeframe = %timeframe,
                        source = self.market.name(),
                        error = %e,
                        "Candle fetch failed, skipping timeframe this cycle"
                    );
                    report.failed += 1;
                    continue;
                }
            };
            report.evaluated += 1;

            let evaluation = self.detector.evaluate(&series);
            let Some(alert) = self.build_alert(timeframe, &series, &evaluation) else {
                tracing::debug!(
                    symbol = %self.symbol,
                    timeframe = %timeframe,
                    candles = series.len(),
                    has_pivot_pair = evaluation.pair.is_some(),
                    "No divergence"
                );
                continue;
            };

            let message = alert.message();
            tracing::info!(
                symbol = %self.symbol,
                timeframe = %timeframe,
                signal = %alert.signal,
                pivot_index = alert.pivot.index,
                "🔔 {}", message
            );

            if let Err(e) = self.notifier.notify(&message).await {
                tracing::error!(
                    notifier = self.notifier.name(),
                    timeframe = %timeframe,
                    error = %e,
                    "Failed to deliver alert"
                );
            }

            report.alerts.push(alert);
        }

        report
    }

    fn build_alert(
        &self,
        timeframe: Timeframe,
        series: &[PricePoint],
        evaluation: &DivergenceReport,
    ) -> Option<Alert> {
        if !evaluation.signal.is_signal() {
            return None;
        }
        let pair = evaluation.pair?;
        let newest = series.last()?;
        let pivot_point = series.get(pair.latest.index)?;

        Some(Alert {
            symbol: self.symbol.clone(),
            timeframe,
            signal: evaluation.signal,
            candle_time: newest.timestamp,
            pivot: pair.latest,
            pivot_time: pivot_point.timestamp,
        })
    }
}
