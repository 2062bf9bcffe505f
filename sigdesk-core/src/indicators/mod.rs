//! Streaming indicator implementations.
//!
//! Every indicator is a small state machine: `update()` consumes one candle and
//! returns the value for that candle. Batch computation folds `update()` over
//! the series from a reset state, so the value at bar t is the value a prefix
//! recomputation over bars 0..=t would produce.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Streaming makes this structural: `update()` never sees a later candle.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod keltner;
pub mod rsi;
pub mod squeeze;
pub mod supertrend;

pub use adx::{Adx, DirectionalIndex};
pub use atr::{Atr, TrueRange, WilderSmoother};
pub use bollinger::{Bands, Bollinger};
pub use ema::Ema;
pub use keltner::Keltner;
pub use rsi::Rsi;
pub use squeeze::Squeeze;
pub use supertrend::Supertrend;

use crate::domain::Candle;

/// Trait for streaming indicators.
pub trait Indicator: Send + Sync {
    type Output: Copy;

    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces trustworthy output.
    fn lookback(&self) -> usize;

    /// Advance the state by one candle and return the value for that candle.
    ///
    /// Void candles must not advance the state.
    fn update(&mut self, candle: &Candle) -> Self::Output;

    /// Return to the freshly constructed state.
    fn reset(&mut self);
}

/// Compute an indicator over a whole series from a fresh state.
pub fn compute_series<I: Indicator + Clone>(indicator: &I, candles: &[Candle]) -> Vec<I::Output> {
    let mut state = indicator.clone();
    state.reset();
    candles.iter().map(|c| state.update(c)).collect()
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one candle per hour.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            ohlc_candle(i, open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect()
}

/// Create synthetic candles from explicit OHLC tuples, one per hour.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| ohlc_candle(i, open, high, low, close))
        .collect()
}

#[cfg(test)]
fn ohlc_candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    Candle {
        timestamp: base + chrono::Duration::hours(i as i64),
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
