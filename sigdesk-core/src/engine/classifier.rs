//! Strength-tiered signal classifier.
//!
//! A pure function of one snapshot and its alignment flags. Tiers are tried in
//! the fixed order STRONG-LONG, WEAK-LONG, STRONG-SHORT, WEAK-SHORT and the
//! first match wins. Undefined (NaN) inputs fail every numeric comparison, so
//! an incomplete snapshot classifies as NONE.

use crate::config::{ClassifierConfig, TierGate};
use crate::domain::{Direction, SignalDecision, Strength, TrendDirection};

use super::mtf::MtfFlags;
use super::snapshot::IndicatorSnapshot;

fn trend_up(s: &IndicatorSnapshot) -> bool {
    s.close > s.ema_trend && s.ema_fast > s.ema_slow
}

fn trend_down(s: &IndicatorSnapshot) -> bool {
    s.close < s.ema_trend && s.ema_fast < s.ema_slow
}

/// Gates shared by both long tiers, excluding the slope.
fn long_gate(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    trend_up(s)
        && s.rsi <= gate.oscillator
        && s.adx >= gate.min_adx
        && s.plus_di > s.minus_di
        && s.supertrend != Some(TrendDirection::Down)
        && !s.squeeze_on
        && flags.long
}

fn short_gate(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    trend_down(s)
        && s.rsi >= gate.oscillator
        && s.adx >= gate.min_adx
        && s.minus_di > s.plus_di
        && s.supertrend != Some(TrendDirection::Up)
        && !s.squeeze_on
        && flags.short
}

fn strong_long(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    s.slope > gate.slope && long_gate(s, flags, gate)
}

fn weak_long(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    s.slope >= gate.slope && long_gate(s, flags, gate)
}

fn strong_short(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    s.slope < gate.slope && short_gate(s, flags, gate)
}

fn weak_short(s: &IndicatorSnapshot, flags: MtfFlags, gate: &TierGate) -> bool {
    s.slope <= gate.slope && short_gate(s, flags, gate)
}

/// Classify one bar.
pub fn classify(
    snapshot: &IndicatorSnapshot,
    flags: MtfFlags,
    config: &ClassifierConfig,
) -> SignalDecision {
    let diagnostics = snapshot.diagnostics();
    let weak = config.classification_enabled && config.weak_signals_enabled;

    let (direction, strength) = if strong_long(snapshot, flags, &config.strong_long) {
        (Direction::Long, Strength::Strong)
    } else if weak && weak_long(snapshot, flags, &config.weak_long) {
        (Direction::Long, Strength::Weak)
    } else if strong_short(snapshot, flags, &config.strong_short) {
        (Direction::Short, Strength::Strong)
    } else if weak && weak_short(snapshot, flags, &config.weak_short) {
        (Direction::Short, Strength::Weak)
    } else {
        return SignalDecision::none(diagnostics);
    };
    SignalDecision::new(direction, strength, diagnostics)
}
