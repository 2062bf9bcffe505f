//! Look-ahead contamination tests for every indicator and the snapshot engine.
//!
//! Invariant: no value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and the full series
//! (bars 0..300). Bars 0..150 must be identical, NaN for NaN, between both runs.

use chrono::{Duration, TimeZone, Utc};
use sigdesk_core::config::IndicatorParams;
use sigdesk_core::domain::Candle;
use sigdesk_core::engine::IndicatorEngine;
use sigdesk_core::indicators::*;

/// Deterministic pseudo-random walk using a simple LCG.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);
            let open = price - 0.5;
            let close = price + 0.3;
            Candle {
                timestamp: start + Duration::hours(i as i64),
                open,
                high: open.max(close) + 2.0,
                low: open.min(close) - 2.0,
                close,
                volume: 1000.0 + i as f64 * 100.0,
            }
        })
        .collect()
}

fn same(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

fn assert_no_lookahead<I>(
    indicator: &I,
    candles: &[Candle],
    truncated_len: usize,
    eq: impl Fn(&I::Output, &I::Output) -> bool,
) where
    I: Indicator + Clone,
    I::Output: std::fmt::Debug,
{
    let full = compute_series(indicator, candles);
    let truncated = compute_series(indicator, &candles[..truncated_len]);
    assert_eq!(full.len(), candles.len(), "{}: full length", indicator.name());
    assert_eq!(truncated.len(), truncated_len, "{}: truncated length", indicator.name());
    for (i, (t, f)) in truncated.iter().zip(&full).enumerate() {
        assert!(
            eq(t, f),
            "{}: look-ahead at bar {i} (truncated={t:?}, full={f:?})",
            indicator.name()
        );
    }
}

fn scalar(a: &f64, b: &f64) -> bool {
    same(*a, *b)
}

fn bands(a: &Bands, b: &Bands) -> bool {
    same(a.upper, b.upper) && same(a.middle, b.middle) && same(a.lower, b.lower)
}

#[test]
fn scalar_indicators_have_no_lookahead() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Ema::new(20), &candles, 150, scalar);
    assert_no_lookahead(&Ema::new(200), &candles, 150, scalar);
    assert_no_lookahead(&Rsi::new(14), &candles, 150, scalar);
    assert_no_lookahead(&Atr::new(14), &candles, 150, scalar);
}

#[test]
fn directional_index_has_no_lookahead() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Adx::new(14), &candles, 150, |a, b| {
        same(a.adx, b.adx) && same(a.plus_di, b.plus_di) && same(a.minus_di, b.minus_di)
    });
}

#[test]
fn band_indicators_have_no_lookahead() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Bollinger::new(20, 2.0), &candles, 150, bands);
    assert_no_lookahead(&Keltner::new(20, 1.5), &candles, 150, bands);
    assert_no_lookahead(&Squeeze::new(20, 2.0, 20, 1.5), &candles, 150, |a, b| a == b);
}

#[test]
fn supertrend_has_no_lookahead() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Supertrend::new(10, 3.0), &candles, 150, |a, b| a == b);
}

#[test]
fn snapshots_have_no_lookahead() {
    let candles = make_test_candles(300);
    let params = IndicatorParams::default();
    let engine = IndicatorEngine::new(&params);
    assert_no_lookahead(&engine, &candles, 150, |a, b| {
        a.timestamp == b.timestamp
            && same(a.ema_fast, b.ema_fast)
            && same(a.ema_slow, b.ema_slow)
            && same(a.ema_trend, b.ema_trend)
            && same(a.rsi, b.rsi)
            && same(a.atr, b.atr)
            && same(a.adx, b.adx)
            && same(a.plus_di, b.plus_di)
            && same(a.minus_di, b.minus_di)
            && same(a.slope, b.slope)
            && a.supertrend == b.supertrend
            && a.squeeze_on == b.squeeze_on
    });
}

#[test]
fn mutating_future_candles_leaves_past_snapshots_unchanged() {
    let candles = make_test_candles(260);
    let mut shocked = candles.clone();
    for c in shocked.iter_mut().skip(200) {
        c.close *= 3.0;
        c.high *= 3.0;
        c.low *= 0.2;
    }
    let params = IndicatorParams::default();
    let a = IndicatorEngine::compute(&params, &candles);
    let b = IndicatorEngine::compute(&params, &shocked);
    for i in 0..200 {
        assert!(same(a[i].rsi, b[i].rsi), "rsi changed at bar {i}");
        assert!(same(a[i].adx, b[i].adx), "adx changed at bar {i}");
        assert!(same(a[i].slope, b[i].slope), "slope changed at bar {i}");
    }
}
