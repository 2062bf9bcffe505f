//! Volatility squeeze: Bollinger Bands fully inside the Keltner Channel.
//!
//! Off whenever either band set is undefined.

use super::bollinger::Bollinger;
use super::keltner::Keltner;
use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Squeeze {
    bollinger: Bollinger,
    keltner: Keltner,
    name: String,
}

impl Squeeze {
    pub fn new(bb_period: usize, bb_mult: f64, kc_period: usize, kc_mult: f64) -> Self {
        Self {
            bollinger: Bollinger::new(bb_period, bb_mult),
            keltner: Keltner::new(kc_period, kc_mult),
            name: format!("squeeze_{bb_period}_{bb_mult}_{kc_period}_{kc_mult}"),
        }
    }
}

impl Indicator for Squeeze {
    type Output = bool;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.bollinger.lookback().max(self.keltner.lookback())
    }

    fn update(&mut self, candle: &Candle) -> bool {
        let bb = self.bollinger.update(candle);
        let kc = self.keltner.update(candle);
        bb.is_defined() && kc.is_defined() && bb.upper < kc.upper && bb.lower > kc.lower
    }

    fn reset(&mut self) {
        self.bollinger.reset();
        self.keltner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{compute_series, make_ohlc_candles};

    #[test]
    fn quiet_closes_with_wide_ranges_squeeze() {
        // Closes barely move while each bar spans a wide range: BB collapses,
        // KC stays wide.
        let data: Vec<_> = (0..30)
            .map(|i| {
                let c = 100.0 + if i % 2 == 0 { 0.05 } else { -0.05 };
                (c, c + 4.0, c - 4.0, c)
            })
            .collect();
        let candles = make_ohlc_candles(&data);
        let result = compute_series(&Squeeze::new(20, 2.0, 20, 1.5), &candles);
        assert!(!result[0]);
        assert!(*result.last().unwrap());
    }

    #[test]
    fn trending_closes_do_not_squeeze() {
        let data: Vec<_> = (0..30)
            .map(|i| {
                let c = 100.0 + i as f64 * 3.0;
                (c - 0.2, c + 0.3, c - 0.3, c)
            })
            .collect();
        let candles = make_ohlc_candles(&data);
        let result = compute_series(&Squeeze::new(20, 2.0, 20, 1.5), &candles);
        assert!(result.iter().all(|on| !on));
    }
}
