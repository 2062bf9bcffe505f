//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! Directional movement starts on the second bar, so +DI/-DI are defined from
//! bar `period` and ADX from bar `2 * period - 1`.

use super::atr::WilderSmoother;
use super::Indicator;
use crate::domain::Candle;

/// ADX together with its two directional components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalIndex {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

impl DirectionalIndex {
    pub const UNDEFINED: Self = Self {
        adx: f64::NAN,
        plus_di: f64::NAN,
        minus_di: f64::NAN,
    };
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    prev: Option<(f64, f64, f64)>,
    smooth_tr: WilderSmoother,
    smooth_plus_dm: WilderSmoother,
    smooth_minus_dm: WilderSmoother,
    smooth_dx: WilderSmoother,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            prev: None,
            smooth_tr: WilderSmoother::new(period),
            smooth_plus_dm: WilderSmoother::new(period),
            smooth_minus_dm: WilderSmoother::new(period),
            smooth_dx: WilderSmoother::new(period),
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    type Output = DirectionalIndex;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn update(&mut self, candle: &Candle) -> DirectionalIndex {
        if candle.is_void() {
            return DirectionalIndex::UNDEFINED;
        }
        let Some((prev_high, prev_low, prev_close)) =
            self.prev.replace((candle.high, candle.low, candle.close))
        else {
            return DirectionalIndex::UNDEFINED;
        };

        let high_diff = candle.high - prev_high;
        let low_diff = prev_low - candle.low;
        let plus_dm = if high_diff > low_diff && high_diff > 0.0 {
            high_diff
        } else {
            0.0
        };
        let minus_dm = if low_diff > high_diff && low_diff > 0.0 {
            low_diff
        } else {
            0.0
        };
        let tr = (candle.high - candle.low)
            .max((candle.high - prev_close).abs())
            .max((candle.low - prev_close).abs());

        let s_tr = self.smooth_tr.push(tr);
        let s_plus = self.smooth_plus_dm.push(plus_dm);
        let s_minus = self.smooth_minus_dm.push(minus_dm);
        if s_tr.is_nan() || s_plus.is_nan() || s_minus.is_nan() {
            return DirectionalIndex::UNDEFINED;
        }

        // A perfectly flat window has no direction at all.
        let (plus_di, minus_di) = if s_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };

        DirectionalIndex {
            adx: self.smooth_dx.push(dx),
            plus_di,
            minus_di,
        }
    }

    fn reset(&mut self) {
        self.prev = None;
        self.smooth_tr.reset();
        self.smooth_plus_dm.reset();
        self.smooth_minus_dm.reset();
        self.smooth_dx.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{compute_series, make_ohlc_candles};

    #[test]
    fn adx_bounds() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let result = compute_series(&Adx::new(3), &candles);

        for (i, v) in result.iter().enumerate() {
            if !v.adx.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v.adx),
                    "ADX out of bounds at bar {i}: {}",
                    v.adx
                );
            }
        }
    }

    #[test]
    fn adx_defined_from_lookback() {
        let data: Vec<_> = (0..12)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 2.0, base - 2.0, base + 1.0)
            })
            .collect();
        let candles = make_ohlc_candles(&data);
        let adx = Adx::new(3);
        let result = compute_series(&adx, &candles);
        assert!(result[adx.lookback() - 1].adx.is_nan());
        assert!(!result[adx.lookback()].adx.is_nan());
        assert!(result[2].plus_di.is_nan());
        assert!(!result[3].plus_di.is_nan());
    }

    #[test]
    fn adx_strong_uptrend() {
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let candles = make_ohlc_candles(&data);
        let result = compute_series(&Adx::new(5), &candles);

        let last = result.last().unwrap();
        assert!(last.adx > 20.0, "ADX should be elevated, got {}", last.adx);
        assert!(last.plus_di > last.minus_di);
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::new(14).lookback(), 27);
        assert_eq!(Adx::new(7).lookback(), 13);
    }

    #[test]
    fn adx_too_few_bars() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = compute_series(&Adx::new(3), &candles);
        assert!(result.iter().all(|v| v.adx.is_nan()));
    }
}
