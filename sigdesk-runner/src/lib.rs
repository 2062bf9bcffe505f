//! SigDesk Runner: backtest orchestration, performance stats, export, sweeps.
//!
//! This crate builds on `sigdesk-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - Candle loading from CSV with a deterministic synthetic fallback
//! - Single-run orchestration producing a serializable `BacktestResult`
//! - Ledger statistics stratified by entry strength and side
//! - JSON / CSV export and the CLI summary table
//! - Parallel parameter sweeps over immutable engine configs

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{run_id, DataConfig, RunConfig, RunConfigError};
pub use data_loader::{load_data, LoadError, LoadedData};
pub use metrics::{Stats, TierStats};
pub use runner::{run_backtest, run_backtest_from_data, BacktestResult, RunError, RunStatus};
pub use sweep::{run_sweep, SweepEntry, SweepGrid, SweepReport};
