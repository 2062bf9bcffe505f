//! Exponential Moving Average (EMA), adjust-free recursive form.
//!
//! EMA[0] = x[0]
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1)
//! Defined from the first bar; `lookback` reports period - 1 as the horizon
//! after which the seed's influence has decayed.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    value: Option<f64>,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            value: None,
            name: format!("ema_{period}"),
        }
    }

    /// Feed one raw value. NaN inputs leave the state untouched and yield NaN.
    pub fn push(&mut self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }
}

impl Indicator for Ema {
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
        self.push(candle.close)
    }

    fn reset(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_candles, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = compute_series(&Ema::new(1), &candles);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seeded with the first close
        // EMA = 10, 10.5, 11.25, 12.125, 13.0625
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = compute_series(&Ema::new(3), &candles);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0625, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_void_candle_does_not_advance() {
        let mut candles = make_candles(&[10.0, 11.0, 12.0, 13.0]);
        candles[2].close = f64::NAN;
        let result = compute_series(&Ema::new(3), &candles);
        assert!(result[2].is_nan());
        // bar 3 continues from bar 1's state
        assert_approx(result[3], 0.5 * 13.0 + 0.5 * 10.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }
}
