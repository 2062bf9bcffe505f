//! Per-bar indicator snapshot and the streaming engine that produces it.
//!
//! The engine owns one state machine per indicator and advances all of them
//! together, one candle at a time. The snapshot for bar i is therefore a
//! function of candles 0..=i only, and equals what a full recomputation over
//! that prefix would produce.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::domain::{Candle, Diagnostics, TrendDirection};
use crate::indicators::{Adx, Atr, Ema, Indicator, Rsi, Squeeze, Supertrend};

/// Typed indicator values for one bar.
///
/// Numeric fields are NaN while undefined (before warm-up or on a void candle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub rsi: f64,
    pub atr: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// Trend overlay; `None` means unknown and is treated as pass-through.
    pub supertrend: Option<TrendDirection>,
    pub squeeze_on: bool,
    pub slope: f64,
}

impl IndicatorSnapshot {
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            rsi: self.rsi,
            atr: self.atr,
            slope: self.slope,
            adx: self.adx,
            squeeze_on: self.squeeze_on,
            supertrend: self.supertrend,
        }
    }
}

/// Streaming producer of [`IndicatorSnapshot`]s.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    ema_fast: Ema,
    ema_slow: Ema,
    ema_trend: Ema,
    rsi: Rsi,
    atr: Atr,
    adx: Adx,
    supertrend: Supertrend,
    squeeze: Squeeze,
    slope_window: usize,
    /// Fast EMA outputs of the last `slope_window + 1` valid bars, oldest first.
    fast_history: VecDeque<f64>,
}

impl IndicatorEngine {
    /// Build an engine from validated parameters.
    ///
    /// # Panics
    /// Panics if any period is zero; `EngineConfig::validate` rejects those.
    pub fn new(params: &IndicatorParams) -> Self {
        Self {
            ema_fast: Ema::new(params.ema_fast),
            ema_slow: Ema::new(params.ema_slow),
            ema_trend: Ema::new(params.ema_trend),
            rsi: Rsi::new(params.rsi_period),
            atr: Atr::new(params.atr_period),
            adx: Adx::new(params.adx_period),
            supertrend: Supertrend::new(params.supertrend_period, params.supertrend_multiplier),
            squeeze: Squeeze::new(
                params.squeeze_bb_period,
                params.squeeze_bb_multiplier,
                params.squeeze_kc_period,
                params.squeeze_kc_multiplier,
            ),
            slope_window: params.slope_window.max(1),
            fast_history: VecDeque::with_capacity(params.slope_window + 1),
        }
    }

    /// Snapshots for a whole series, computed from a fresh state.
    pub fn compute(params: &IndicatorParams, candles: &[Candle]) -> Vec<IndicatorSnapshot> {
        let voids = candles.iter().filter(|c| c.is_void()).count();
        if voids > 0 {
            warn!(
                "{voids} of {} candles are void; their snapshots are undefined",
                candles.len()
            );
        }
        let mut engine = Self::new(params);
        candles.iter().map(|c| engine.update(c)).collect()
    }

    /// Fast EMA slope over `w = min(slope_window, i)` bars; 0 on the first bar.
    ///
    /// Only valid bars enter the window. A void bar yields NaN and leaves the
    /// history untouched.
    fn slope(&mut self, ema_fast: f64) -> f64 {
        if ema_fast.is_nan() {
            return f64::NAN;
        }
        if self.fast_history.len() == self.slope_window + 1 {
            self.fast_history.pop_front();
        }
        self.fast_history.push_back(ema_fast);
        let w = self.fast_history.len() - 1;
        match (self.fast_history.front(), w) {
            (_, 0) => 0.0,
            (Some(&oldest), w) => (ema_fast - oldest) / w as f64,
            (None, _) => 0.0,
        }
    }
}

impl Indicator for IndicatorEngine {
    type Output = IndicatorSnapshot;

    fn name(&self) -> &str {
        "indicator_engine"
    }

    fn lookback(&self) -> usize {
        [
            self.ema_fast.lookback(),
            self.ema_slow.lookback(),
            self.ema_trend.lookback(),
            self.rsi.lookback(),
            self.atr.lookback(),
            self.adx.lookback(),
            self.supertrend.lookback(),
            self.squeeze.lookback(),
            self.slope_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    fn update(&mut self, candle: &Candle) -> IndicatorSnapshot {
        let ema_fast = self.ema_fast.update(candle);
        let ema_slow = self.ema_slow.update(candle);
        let ema_trend = self.ema_trend.update(candle);
        let rsi = self.rsi.update(candle);
        let atr = self.atr.update(candle);
        let di = self.adx.update(candle);
        let supertrend = self.supertrend.update(candle);
        let squeeze_on = self.squeeze.update(candle);
        let slope = self.slope(ema_fast);

        IndicatorSnapshot {
            timestamp: candle.timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            ema_fast,
            ema_slow,
            ema_trend,
            rsi,
            atr,
            adx: di.adx,
            plus_di: di.plus_di,
            minus_di: di.minus_di,
            supertrend,
            squeeze_on,
            slope,
        }
    }

    fn reset(&mut self) {
        self.ema_fast.reset();
        self.ema_slow.reset();
        self.ema_trend.reset();
        self.rsi.reset();
        self.atr.reset();
        self.adx.reset();
        self.supertrend.reset();
        self.squeeze.reset();
        self.fast_history.clear();
    }
}
