//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|);
//! the first bar has no previous close and uses high-low.
//! ATR applies Wilder smoothing (alpha = 1/period) seeded with the mean of
//! the first `period` true ranges.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

/// Streaming true range.
#[derive(Debug, Clone, Default)]
pub struct TrueRange {
    prev_close: Option<f64>,
}

impl TrueRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// True range of `candle` against the previous non-void close.
    pub fn push(&mut self, candle: &Candle) -> f64 {
        if candle.is_void() {
            return f64::NAN;
        }
        let (h, l) = (candle.high, candle.low);
        let tr = match self.prev_close {
            None => h - l,
            Some(pc) => (h - l).max((h - pc).abs()).max((l - pc).abs()),
        };
        self.prev_close = Some(candle.close);
        tr
    }

    pub fn reset(&mut self) {
        self.prev_close = None;
    }
}

/// Streaming Wilder smoothing. NaN until `period` values have been seen.
#[derive(Debug, Clone)]
pub struct WilderSmoother {
    period: usize,
    seen: usize,
    seed_sum: f64,
    value: f64,
}

impl WilderSmoother {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Wilder period must be >= 1");
        Self {
            period,
            seen: 0,
            seed_sum: 0.0,
            value: f64::NAN,
        }
    }

    /// Feed one value. NaN inputs leave the state untouched and yield NaN.
    pub fn push(&mut self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if self.seen < self.period {
            self.seed_sum += x;
            self.seen += 1;
            if self.seen == self.period {
                self.value = self.seed_sum / self.period as f64;
            }
            return self.value;
        }
        let alpha = 1.0 / self.period as f64;
        self.value = alpha * x + (1.0 - alpha) * self.value;
        self.value
    }

    pub fn reset(&mut self) {
        self.seen = 0;
        self.seed_sum = 0.0;
        self.value = f64::NAN;
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    tr: TrueRange,
    smoother: WilderSmoother,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            tr: TrueRange::new(),
            smoother: WilderSmoother::new(period),
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn update(&mut self, candle: &Candle) -> f64 {
        if candle.is_void() {
            return f64::NAN;
        }
        let tr = self.tr.push(candle);
        self.smoother.push(tr)
    }

    fn reset(&mut self) {
        self.tr.reset();
        self.smoother.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_ohlc_candles, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let mut tr = TrueRange::new();
        assert_approx(tr.push(&candles[0]), 10.0, DEFAULT_EPSILON);
        assert_approx(tr.push(&candles[1]), 8.0, DEFAULT_EPSILON);
        assert_approx(tr.push(&candles[2]), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candles = make_ohlc_candles(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let mut tr = TrueRange::new();
        tr.push(&candles[0]);
        assert_approx(tr.push(&candles[1]), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = compute_series(&Atr::new(3), &candles);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // Seed: mean(10, 8, 9) = 9
        // ATR[3] = (1/3)*6 + (2/3)*9 = 8
        // ATR[4] = (1/3)*6 + (2/3)*8 = 22/3
        assert_approx(result[2], 9.0, DEFAULT_EPSILON);
        assert_approx(result[3], 8.0, DEFAULT_EPSILON);
        assert_approx(result[4], 22.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_nan_is_skipped() {
        let mut smoother = WilderSmoother::new(2);
        let result: Vec<f64> = [1.0, f64::NAN, 3.0, 5.0]
            .iter()
            .map(|&v| smoother.push(v))
            .collect();
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 13);
    }
}
