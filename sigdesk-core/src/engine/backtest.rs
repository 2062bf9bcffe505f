//! Single-run entry point: candles in, [`RunOutcome`] out.

use chrono::Duration;
use log::{info, warn};
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::domain::{validate_series, Candle, CandleError, SignalDecision};

use super::classifier::classify;
use super::mtf::{align, CoarseSeries, MtfFlags};
use super::simulator::{PositionSimulator, SimulationReport};
use super::snapshot::{IndicatorEngine, IndicatorSnapshot};

/// Why a run produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoResultReason {
    #[error("insufficient data: {available} bars, warm-up requires {required}")]
    InsufficientData { required: usize, available: usize },
    #[error("invalid base series: {0}")]
    InvalidSeries(#[source] CandleError),
    #[error("invalid {which} coarse series: {source}")]
    InvalidCoarseSeries {
        which: &'static str,
        #[source]
        source: CandleError,
    },
}

/// Outcome of one run. "No result" is a value, distinct from zero trades.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(SimulationReport),
    NoResult(NoResultReason),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&SimulationReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::NoResult(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

/// A validated configuration ready to run against candle series.
#[derive(Debug, Clone)]
pub struct Backtest {
    config: EngineConfig,
}

impl Backtest {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshots(&self, candles: &[Candle]) -> Vec<IndicatorSnapshot> {
        IndicatorEngine::compute(&self.config.indicators, candles)
    }

    pub fn alignment(
        &self,
        candles: &[Candle],
        base_period: Duration,
        near: Option<&CoarseSeries>,
        far: Option<&CoarseSeries>,
    ) -> Vec<MtfFlags> {
        align(candles, base_period, near, far, &self.config.mtf)
    }

    /// Classifier output for every bar, independent of position state.
    pub fn decisions(
        &self,
        snapshots: &[IndicatorSnapshot],
        flags: &[MtfFlags],
    ) -> Vec<SignalDecision> {
        snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mtf = flags.get(i).copied().unwrap_or(MtfFlags::ALIGNED);
                classify(s, mtf, &self.config.classifier)
            })
            .collect()
    }

    pub fn simulate(
        &self,
        snapshots: &[IndicatorSnapshot],
        flags: &[MtfFlags],
    ) -> SimulationReport {
        PositionSimulator::new(&self.config).run(snapshots, flags)
    }

    /// Validate inputs, compute indicators and alignment, then simulate.
    pub fn run(
        &self,
        candles: &[Candle],
        base_period: Duration,
        near: Option<&CoarseSeries>,
        far: Option<&CoarseSeries>,
    ) -> RunOutcome {
        let required = self.config.warmup_bars;
        if candles.len() < required {
            let reason = NoResultReason::InsufficientData {
                required,
                available: candles.len(),
            };
            warn!("no result: {reason}");
            return RunOutcome::NoResult(reason);
        }
        if let Err(e) = validate_series(candles) {
            let reason = NoResultReason::InvalidSeries(e);
            warn!("no result: {reason}");
            return RunOutcome::NoResult(reason);
        }
        for (which, series) in [("near", near), ("far", far)] {
            if let Some(series) = series {
                if let Err(source) = validate_series(&series.candles) {
                    let reason = NoResultReason::InvalidCoarseSeries { which, source };
                    warn!("no result: {reason}");
                    return RunOutcome::NoResult(reason);
                }
            }
        }

        let snapshots = self.snapshots(candles);
        let flags = self.alignment(candles, base_period, near, far);
        let report = self.simulate(&snapshots, &flags);
        info!(
            "simulated {} bars ({} warm-up): {} trades, {} signals",
            candles.len(),
            required,
            report.trades.len(),
            report.signal_counts.total()
        );
        RunOutcome::Completed(report)
    }
}
