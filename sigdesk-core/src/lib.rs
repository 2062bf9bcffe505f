//! SigDesk Core: indicators, trend alignment, signal classification and
//! position simulation.
//!
//! This crate contains the deterministic heart of the signal desk:
//! - Domain types (candles, signal decisions, positions, trades)
//! - Streaming indicators whose batch output equals prefix recomputation
//! - Multi-timeframe trend alignment with closed-bar forward fill
//! - Strength-tiered classifier (STRONG / WEAK / NONE)
//! - FLAT / IN_POSITION simulator with stop-before-target exits
//!
//! All configuration flows through an immutable [`config::EngineConfig`]
//! value, so independent runs can execute in parallel.

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Backtest, NoResultReason, RunOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every type a parallel sweep shares or returns is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::SignalDecision>();
        require_sync::<domain::SignalDecision>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Configuration
        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();

        // Engine types
        require_send::<engine::IndicatorEngine>();
        require_sync::<engine::IndicatorEngine>();
        require_send::<engine::IndicatorSnapshot>();
        require_sync::<engine::IndicatorSnapshot>();
        require_send::<engine::CoarseSeries>();
        require_sync::<engine::CoarseSeries>();
        require_send::<engine::Backtest>();
        require_sync::<engine::Backtest>();
        require_send::<engine::RunOutcome>();
        require_sync::<engine::RunOutcome>();
    }
}
