//! Backtest runner: wires together data loading, the engine, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: loads data per the config, then runs. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded data and an engine config.
//!   Used by parameter sweeps so every point shares one load.

use log::info;
use serde::{Deserialize, Serialize};
use sigdesk_core::config::{ConfigError, EngineConfig};
use sigdesk_core::domain::{Position, Trade};
use sigdesk_core::engine::{Backtest, RunOutcome, SignalCounts};
use thiserror::Error;

use crate::config::{run_id, RunConfig, RunConfigError};
use crate::data_loader::{load_data, LoadError, LoadedData};
use crate::metrics::Stats;

/// Errors from the runner. A run that could not produce a result is not an
/// error; see [`RunStatus::NoResult`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] RunConfigError),
    #[error("engine config error: {0}")]
    Engine(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("failed to fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoResult { reason: String },
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub run_id: String,
    pub status: RunStatus,
    pub trades: Vec<Trade>,
    pub stats: Stats,
    pub open_position: Option<Position>,
    #[serde(default)]
    pub signal_counts: SignalCounts,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub dataset_hash: String,
    pub synthetic: bool,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Load data per `config` and run it.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let data = load_data(&config.data)?;
    run_backtest_from_data(&config.data.symbol, &data, &config.engine)
}

/// Run a backtest with pre-loaded data without I/O.
pub fn run_backtest_from_data(
    symbol: &str,
    data: &LoadedData,
    engine: &EngineConfig,
) -> Result<BacktestResult, RunError> {
    let backtest = Backtest::new(engine.clone())?;
    let run_id = run_id(symbol, &data.dataset_hash, engine)?;
    let outcome = backtest.run(
        &data.base,
        data.base_period,
        data.near.as_ref(),
        data.far.as_ref(),
    );

    let mut result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        run_id,
        status: RunStatus::Completed,
        trades: Vec::new(),
        stats: Stats::default(),
        open_position: None,
        signal_counts: SignalCounts::default(),
        bar_count: data.base.len(),
        warmup_bars: engine.warmup_bars,
        dataset_hash: data.dataset_hash.clone(),
        synthetic: data.synthetic,
    };

    match outcome {
        RunOutcome::Completed(report) => {
            result.stats = Stats::compute(&report.trades);
            result.trades = report.trades;
            result.open_position = report.open_position;
            result.signal_counts = report.signal_counts;
            info!(
                "{symbol}: {} trades, win rate {:.1}%, total {:.2}%",
                result.stats.overall.trade_count,
                result.stats.overall.win_rate * 100.0,
                result.stats.overall.total_pnl_pct
            );
        }
        RunOutcome::NoResult(reason) => {
            info!("{symbol}: no result ({reason})");
            result.status = RunStatus::NoResult {
                reason: reason.to_string(),
            };
        }
    }
    Ok(result)
}
