//! Signal engine: indicators, alignment, classification and simulation.
//!
//! A run flows through four stages:
//!
//! 1. `IndicatorEngine` streams candles into typed snapshots
//! 2. `align` forward-fills coarse-timeframe trends onto the base bars
//! 3. `classify` turns each snapshot into a tiered `SignalDecision`
//! 4. `PositionSimulator` walks the bars and records trades
//!
//! `Backtest` ties the stages together behind a validated configuration.

pub mod backtest;
pub mod classifier;
pub mod mtf;
pub mod simulator;
pub mod snapshot;

pub use backtest::{Backtest, NoResultReason, RunOutcome};
pub use classifier::classify;
pub use mtf::{align, coarse_trend, resample, CoarseSeries, MtfFlags};
pub use simulator::{check_exit, open_position, PositionSimulator, SignalCounts, SimulationReport};
pub use snapshot::{IndicatorEngine, IndicatorSnapshot};
