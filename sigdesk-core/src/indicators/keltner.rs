//! Keltner Channel: EMA +/- ATR multiplier.
//!
//! - Middle: EMA(close, period)
//! - Upper: middle + mult * ATR(period)
//! - Lower: middle - mult * ATR(period)
//!
//! Lookback: period - 1 (ATR seeding dominates; the EMA is defined from bar 0).

use super::atr::Atr;
use super::bollinger::Bands;
use super::ema::Ema;
use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Keltner {
    period: usize,
    multiplier: f64,
    ema: Ema,
    atr: Atr,
    name: String,
}

impl Keltner {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self {
            period,
            multiplier,
            ema: Ema::new(period),
            atr: Atr::new(period),
            name: format!("keltner_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Keltner {
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
        let middle = self.ema.update(candle);
        let atr = self.atr.update(candle);
        if atr.is_nan() {
            return Bands::UNDEFINED;
        }
        Bands {
            upper: middle + self.multiplier * atr,
            middle,
            lower: middle - self.multiplier * atr,
        }
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.atr.reset();
    }
}
