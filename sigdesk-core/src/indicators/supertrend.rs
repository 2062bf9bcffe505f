//! Supertrend: ATR-based trend-following overlay.
//!
//! Inherently sequential: the final bands only tighten while price stays on
//! their side, and the direction flips when the close crosses the active band.
//!
//! Output: the current trend direction, `None` until ATR is seeded.

use super::atr::Atr;
use super::Indicator;
use crate::domain::{Candle, TrendDirection};

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    atr: Atr,
    bands: Option<(f64, f64)>,
    trending_up: bool,
    prev_close: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        Self {
            period,
            multiplier,
            atr: Atr::new(period),
            bands: None,
            trending_up: true,
            prev_close: f64::NAN,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Supertrend {
    type Output = Option<TrendDirection>;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.atr.lookback()
    }

    fn update(&mut self, candle: &Candle) -> Option<TrendDirection> {
        if candle.is_void() {
            return None;
        }
        let atr = self.atr.update(candle);
        let prev_close = std::mem::replace(&mut self.prev_close, candle.close);
        if atr.is_nan() {
            return None;
        }

        let hl2 = (candle.high + candle.low) / 2.0;
        let basic_upper = hl2 + self.multiplier * atr;
        let basic_lower = hl2 - self.multiplier * atr;

        let (upper, lower) = match self.bands {
            None => {
                // Start trending up (support)
                self.trending_up = true;
                (basic_upper, basic_lower)
            }
            Some((upper_band, lower_band)) => {
                // Upper band can only decrease while price stays below it
                let upper = if prev_close <= upper_band {
                    basic_upper.min(upper_band)
                } else {
                    basic_upper
                };
                // Lower band can only increase while price stays above it
                let lower = if prev_close >= lower_band {
                    basic_lower.max(lower_band)
                } else {
                    basic_lower
                };

                if self.trending_up && candle.close < lower {
                    self.trending_up = false;
                } else if !self.trending_up && candle.close > upper {
                    self.trending_up = true;
                }
                (upper, lower)
            }
        };
        self.bands = Some((upper, lower));

        Some(if self.trending_up {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        })
    }

    fn reset(&mut self) {
        self.atr.reset();
        self.bands = None;
        self.trending_up = true;
        self.prev_close = f64::NAN;
    }
}
