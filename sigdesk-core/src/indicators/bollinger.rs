//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N) over a rolling window.
//! Lookback: period - 1.

use std::collections::VecDeque;

use super::Indicator;
use crate::domain::Candle;

/// Upper/middle/lower band triple. NaN while undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Bands {
    pub const UNDEFINED: Self = Self {
        upper: f64::NAN,
        middle: f64::NAN,
        lower: f64::NAN,
    };

    pub fn is_defined(&self) -> bool {
        !(self.upper.is_nan() || self.middle.is_nan() || self.lower.is_nan())
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    window: VecDeque<f64>,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            window: VecDeque::with_capacity(period),
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    type Output = Bands;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn update(&mut self, candle: &Candle) -> Bands {
        if candle.is_void() {
            return Bands::UNDEFINED;
        }
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(candle.close);
        if self.window.len() < self.period {
            return Bands::UNDEFINED;
        }

        let n = self.period as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let variance = self
            .window
            .iter()
            .map(|c| {
                let diff = c - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let width = self.multiplier * variance.sqrt();

        Bands {
            upper: mean + width,
            middle: mean,
            lower: mean - width,
        }
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, make_candles, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = compute_series(&Bollinger::new(3, 2.0), &candles);

        assert!(!result[0].is_defined());
        assert!(!result[1].is_defined());
        assert_approx(result[2].middle, 11.0, DEFAULT_EPSILON);
        assert_approx(result[3].middle, 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = compute_series(&Bollinger::new(3, 2.0), &candles);
        for b in &result[2..] {
            assert_approx(b.upper - b.middle, b.middle - b.lower, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let candles = make_candles(&[100.0, 100.0, 100.0, 100.0]);
        let result = compute_series(&Bollinger::new(3, 2.0), &candles);
        assert_approx(result[2].upper, 100.0, DEFAULT_EPSILON);
        assert_approx(result[2].lower, 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_lookback() {
        assert_eq!(Bollinger::new(20, 2.0).lookback(), 19);
    }
}
