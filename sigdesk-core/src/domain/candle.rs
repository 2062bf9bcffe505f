//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV sample for one fixed interval.
///
/// `timestamp` marks the start of the interval. Series are ordered by
/// strictly increasing timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any price field is NaN (void candle).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high bounds the body from above, low from below.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("candle {index} at {timestamp} is not after the previous candle")]
    NotIncreasing {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("candle {index} has negative volume {volume}")]
    NegativeVolume { index: usize, volume: f64 },
    #[error("candle {index} has high {high} below low {low}")]
    HighBelowLow { index: usize, high: f64, low: f64 },
}

/// Check the ordering and shape invariants of a candle series.
///
/// Void candles are allowed (they are neutralised downstream); only their
/// position in time is checked.
pub fn validate_series(candles: &[Candle]) -> Result<(), CandleError> {
    for (i, c) in candles.iter().enumerate() {
        if i > 0 && c.timestamp <= candles[i - 1].timestamp {
            return Err(CandleError::NotIncreasing {
                index: i,
                timestamp: c.timestamp,
            });
        }
        if c.volume < 0.0 {
            return Err(CandleError::NegativeVolume {
                index: i,
                volume: c.volume,
            });
        }
        if !c.is_void() && c.high < c.low {
            return Err(CandleError::HighBelowLow {
                index: i,
                high: c.high,
                low: c.low,
            });
        }
    }
    Ok(())
}
