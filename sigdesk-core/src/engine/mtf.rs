//! Multi-timeframe trend alignment.
//!
//! Each coarse series yields a trend boolean per coarse bar (close above its
//! own EMA). Those booleans are forward-filled onto the base grid: a coarse
//! bar only becomes visible once it has closed, i.e. once
//! `coarse.timestamp + coarse.period <= base.timestamp + base_period`.
//! `mtf_long` requires both coarse trends up, `mtf_short` both down.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::MtfParams;
use crate::domain::Candle;
use crate::indicators::{Ema, Indicator};

/// A coarser-timeframe candle series with its bar length.
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseSeries {
    pub candles: Vec<Candle>,
    pub period: Duration,
}

impl CoarseSeries {
    pub fn new(candles: Vec<Candle>, period: Duration) -> Self {
        Self { candles, period }
    }

    /// Build a coarse series by aggregating `factor` base bars per coarse bar.
    ///
    /// A factor whose period cannot be represented yields an empty series,
    /// which alignment treats as absent.
    pub fn from_base(base: &[Candle], base_period: Duration, factor: usize) -> Self {
        let period = i32::try_from(factor)
            .ok()
            .and_then(|f| base_period.checked_mul(f));
        match period {
            Some(period) => Self {
                candles: resample(base, factor),
                period,
            },
            None => Self {
                candles: Vec::new(),
                period: base_period,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Alignment flags for one base bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtfFlags {
    pub long: bool,
    pub short: bool,
}

impl MtfFlags {
    /// Used when alignment is disabled or a coarse series is missing.
    pub const ALIGNED: Self = Self {
        long: true,
        short: true,
    };
    /// Used while a coarse trend is still unknown.
    pub const UNKNOWN: Self = Self {
        long: false,
        short: false,
    };

    fn from_trends(near: Option<bool>, far: Option<bool>) -> Self {
        match (near, far) {
            (Some(true), Some(true)) => Self {
                long: true,
                short: false,
            },
            (Some(false), Some(false)) => Self {
                long: false,
                short: true,
            },
            _ => Self::UNKNOWN,
        }
    }
}

/// Aggregate consecutive groups of `factor` candles.
///
/// Open of the first, max high, min low, close of the last, summed volume,
/// timestamp of the first. Void candles inside a group are ignored; an all-void
/// group yields a void candle. A trailing partial group is dropped.
pub fn resample(candles: &[Candle], factor: usize) -> Vec<Candle> {
    if factor == 0 {
        return Vec::new();
    }
    candles
        .chunks_exact(factor)
        .map(|group| {
            let mut valid = group.iter().filter(|c| !c.is_void());
            let Some(first) = valid.next() else {
                return Candle {
                    timestamp: group[0].timestamp,
                    open: f64::NAN,
                    high: f64::NAN,
                    low: f64::NAN,
                    close: f64::NAN,
                    volume: 0.0,
                };
            };
            let init = Candle {
                timestamp: group[0].timestamp,
                ..*first
            };
            valid.fold(init, |acc, c| Candle {
                high: acc.high.max(c.high),
                low: acc.low.min(c.low),
                close: c.close,
                volume: acc.volume + c.volume,
                ..acc
            })
        })
        .collect()
}

/// Trend boolean per coarse bar: `Some(close > ema)`, `None` on void bars.
pub fn coarse_trend(series: &CoarseSeries, ema_period: usize) -> Vec<Option<bool>> {
    let mut ema = Ema::new(ema_period);
    series
        .candles
        .iter()
        .map(|c| {
            let value = ema.update(c);
            (!value.is_nan()).then(|| c.close > value)
        })
        .collect()
}

/// Forward-fill a coarse trend onto the base grid, carrying the last known
/// value of every closed coarse bar.
fn forward_fill(
    base: &[Candle],
    base_period: Duration,
    coarse: &CoarseSeries,
    trend: &[Option<bool>],
) -> Vec<Option<bool>> {
    let mut next = 0;
    let mut last_known = None;
    base.iter()
        .map(|bar| {
            let horizon = bar.timestamp + base_period;
            while next < coarse.candles.len()
                && coarse.candles[next].timestamp + coarse.period <= horizon
            {
                if let Some(t) = trend[next] {
                    last_known = Some(t);
                }
                next += 1;
            }
            last_known
        })
        .collect()
}

/// Alignment flags for every base bar.
///
/// A missing or empty coarse series degrades to [`MtfFlags::ALIGNED`].
pub fn align(
    base: &[Candle],
    base_period: Duration,
    near: Option<&CoarseSeries>,
    far: Option<&CoarseSeries>,
    params: &MtfParams,
) -> Vec<MtfFlags> {
    let (near, far) = match (params.enabled, near, far) {
        (true, Some(near), Some(far)) if !near.is_empty() && !far.is_empty() => (near, far),
        _ => return vec![MtfFlags::ALIGNED; base.len()],
    };
    let near_trend = forward_fill(
        base,
        base_period,
        near,
        &coarse_trend(near, params.near_ema),
    );
    let far_trend = forward_fill(base, base_period, far, &coarse_trend(far, params.far_ema));
    near_trend
        .into_iter()
        .zip(far_trend)
        .map(|(n, f)| MtfFlags::from_trends(n, f))
        .collect()
}
