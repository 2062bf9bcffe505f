//! Position simulator: a FLAT / IN_POSITION state machine over the bars.
//!
//! Per bar, after warm-up:
//! 1. In a position: check the stop first, then the target, and close at the
//!    breached level. A bar that closes a position never opens another one.
//! 2. Flat: classify the bar and open at its close when the decision is
//!    actionable and ATR gives a positive risk distance.
//!
//! Stop and target are fixed at entry. At most one position is open at a time.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{Direction, ExitReason, Position, Side, SignalDecision, Strength, Trade};

use super::classifier::classify;
use super::mtf::MtfFlags;
use super::snapshot::IndicatorSnapshot;

/// Actionable decisions seen while flat, per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub strong_long: usize,
    pub weak_long: usize,
    pub strong_short: usize,
    pub weak_short: usize,
}

impl SignalCounts {
    pub fn record(&mut self, decision: &SignalDecision) {
        match (decision.direction, decision.strength) {
            (Direction::Long, Strength::Strong) => self.strong_long += 1,
            (Direction::Long, Strength::Weak) => self.weak_long += 1,
            (Direction::Short, Strength::Strong) => self.strong_short += 1,
            (Direction::Short, Strength::Weak) => self.weak_short += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.strong_long + self.weak_long + self.strong_short + self.weak_short
    }
}

/// Everything one simulation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
    /// Position still open after the last bar; not counted as a trade.
    pub open_position: Option<Position>,
    /// Bars at or after the warm-up boundary.
    pub bars_evaluated: usize,
    pub warmup_bars: usize,
    pub signal_counts: SignalCounts,
}

/// Exit check for an open position against one bar's range.
///
/// The stop is checked before the target, so a bar touching both exits at the
/// stop.
pub fn check_exit(position: &Position, high: f64, low: f64) -> Option<(f64, ExitReason)> {
    match position.side {
        Side::Long => {
            if low <= position.stop_loss {
                Some((position.stop_loss, ExitReason::Stop))
            } else if high >= position.take_profit {
                Some((position.take_profit, ExitReason::Target))
            } else {
                None
            }
        }
        Side::Short => {
            if high >= position.stop_loss {
                Some((position.stop_loss, ExitReason::Stop))
            } else if low <= position.take_profit {
                Some((position.take_profit, ExitReason::Target))
            } else {
                None
            }
        }
    }
}

/// Open a position at the snapshot's close, or `None` when the decision is
/// not actionable or ATR does not define a positive risk distance.
pub fn open_position(
    index: usize,
    snapshot: &IndicatorSnapshot,
    decision: SignalDecision,
    config: &EngineConfig,
) -> Option<Position> {
    let side = Side::from_direction(decision.direction)?;
    let atr = snapshot.atr;
    if atr.is_nan() || atr <= 0.0 {
        return None;
    }
    let risk = config.multipliers_for(decision.strength);
    let entry = snapshot.close;
    let (stop_loss, take_profit) = match side {
        Side::Long => (entry - atr * risk.stop_loss, entry + atr * risk.take_profit),
        Side::Short => (entry + atr * risk.stop_loss, entry - atr * risk.take_profit),
    };
    Some(Position {
        side,
        entry_index: index,
        entry_time: snapshot.timestamp,
        entry_price: entry,
        stop_loss,
        take_profit,
        entry_signal: decision,
    })
}

/// Deterministic bar-by-bar simulator bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct PositionSimulator<'a> {
    config: &'a EngineConfig,
}

impl<'a> PositionSimulator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Run over precomputed snapshots and alignment flags.
    ///
    /// A missing flag entry is treated as aligned in both directions.
    pub fn run(&self, snapshots: &[IndicatorSnapshot], flags: &[MtfFlags]) -> SimulationReport {
        let warmup = self.config.warmup_bars;
        let mut trades = Vec::new();
        let mut position: Option<Position> = None;
        let mut signal_counts = SignalCounts::default();

        for (i, snap) in snapshots.iter().enumerate().skip(warmup) {
            if let Some(open) = position {
                if let Some((price, reason)) = check_exit(&open, snap.high, snap.low) {
                    let trade = Trade::close(&open, i, snap.timestamp, price, reason);
                    debug!(
                        "close {} {} @ {:.4} ({}) bar {} pnl {:.3}%",
                        trade.strength.as_str(),
                        trade.side.as_str(),
                        price,
                        reason.as_str(),
                        i,
                        trade.pnl_pct
                    );
                    trades.push(trade);
                    position = None;
                }
                continue;
            }

            let mtf = flags.get(i).copied().unwrap_or(MtfFlags::ALIGNED);
            let decision = classify(snap, mtf, &self.config.classifier);
            signal_counts.record(&decision);
            if let Some(opened) = open_position(i, snap, decision, self.config) {
                debug!(
                    "open {} {} @ {:.4} bar {} sl {:.4} tp {:.4}",
                    decision.strength.as_str(),
                    opened.side.as_str(),
                    opened.entry_price,
                    i,
                    opened.stop_loss,
                    opened.take_profit
                );
                position = Some(opened);
            }
        }

        SimulationReport {
            trades,
            open_position: position,
            bars_evaluated: snapshots.len().saturating_sub(warmup),
            warmup_bars: warmup,
            signal_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Diagnostics, TrendDirection};
    use chrono::{Duration, TimeZone, Utc};

    fn diag() -> Diagnostics {
        Diagnostics {
            rsi: 50.0,
            atr: 2.0,
            slope: 1.5,
            adx: 30.0,
            squeeze_on: false,
            supertrend: None,
        }
    }

    fn long_position(stop: f64, target: f64) -> Position {
        Position {
            side: Side::Long,
            entry_index: 0,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            stop_loss: stop,
            take_profit: target,
            entry_signal: SignalDecision::new(Direction::Long, Strength::Strong, diag()),
        }
    }

    /// Snapshot passing STRONG-LONG; `high`/`low` set the bar range.
    fn snap(i: usize, close: f64, high: f64, low: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
                + Duration::hours(i as i64),
            open: close,
            high,
            low,
            close,
            ema_fast: close - 5.0,
            ema_slow: close - 10.0,
            ema_trend: close - 20.0,
            rsi: 50.0,
            atr: 2.0,
            adx: 30.0,
            plus_di: 30.0,
            minus_di: 10.0,
            supertrend: Some(TrendDirection::Up),
            squeeze_on: false,
            slope: 1.5,
        }
    }

    fn no_warmup() -> EngineConfig {
        EngineConfig {
            warmup_bars: 0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn stop_wins_when_both_levels_touched() {
        let long = long_position(97.0, 106.0);
        assert_eq!(check_exit(&long, 110.0, 90.0), Some((97.0, ExitReason::Stop)));

        let short = Position {
            side: Side::Short,
            stop_loss: 103.0,
            take_profit: 94.0,
            ..long
        };
        assert_eq!(check_exit(&short, 110.0, 90.0), Some((103.0, ExitReason::Stop)));
    }

    #[test]
    fn target_hit_and_untouched() {
        let long = long_position(97.0, 106.0);
        assert_eq!(check_exit(&long, 106.0, 99.0), Some((106.0, ExitReason::Target)));
        assert_eq!(check_exit(&long, 105.0, 98.0), None);
    }

    #[test]
    fn void_bar_never_exits() {
        let long = long_position(97.0, 106.0);
        assert_eq!(check_exit(&long, f64::NAN, f64::NAN), None);
    }

    #[test]
    fn entry_levels_use_strength_multipliers() {
        let config = EngineConfig::default();
        let s = snap(0, 100.0, 101.0, 99.0);
        let strong = SignalDecision::new(Direction::Long, Strength::Strong, s.diagnostics());
        let p = open_position(0, &s, strong, &config).unwrap();
        assert_eq!((p.stop_loss, p.take_profit), (97.0, 106.0));

        let weak = SignalDecision::new(Direction::Short, Strength::Weak, s.diagnostics());
        let p = open_position(0, &s, weak, &config).unwrap();
        assert_eq!((p.stop_loss, p.take_profit), (104.0, 92.0));
    }

    #[test]
    fn non_positive_atr_skips_entry() {
        let config = EngineConfig::default();
        for atr in [0.0, -1.0, f64::NAN] {
            let s = IndicatorSnapshot {
                atr,
                ..snap(0, 100.0, 101.0, 99.0)
            };
            let d = SignalDecision::new(Direction::Long, Strength::Strong, s.diagnostics());
            assert!(open_position(0, &s, d, &config).is_none());
        }
    }

    #[test]
    fn exit_bar_does_not_reenter() {
        let config = no_warmup();
        // bar 0 opens long @100 (sl 97, tp 106); bar 1 hits the target and
        // would qualify for a new entry; bar 2 re-enters.
        let snaps = vec![
            snap(0, 100.0, 100.5, 99.5),
            snap(1, 105.0, 107.0, 104.0),
            snap(2, 105.0, 105.5, 104.5),
        ];
        let report = PositionSimulator::new(&config).run(&snaps, &[]);
        assert_eq!(report.trades.len(), 1);
        let t = &report.trades[0];
        assert_eq!((t.entry_index, t.exit_index), (0, 1));
        assert_eq!(t.exit_reason, ExitReason::Target);
        assert_eq!(t.exit_price, 106.0);
        assert!((t.pnl_pct - 6.0).abs() < 1e-12);
        let open = report.open_position.unwrap();
        assert_eq!(open.entry_index, 2);
        assert_eq!(report.signal_counts.strong_long, 2);
    }

    #[test]
    fn warmup_bars_are_skipped_entirely() {
        let config = EngineConfig {
            warmup_bars: 2,
            ..EngineConfig::default()
        };
        let snaps: Vec<_> = (0..3).map(|i| snap(i, 100.0, 100.5, 99.5)).collect();
        let report = PositionSimulator::new(&config).run(&snaps, &[]);
        assert_eq!(report.bars_evaluated, 1);
        assert_eq!(report.open_position.unwrap().entry_index, 2);
    }

    #[test]
    fn blocked_flags_prevent_entry() {
        let config = no_warmup();
        let snaps = vec![snap(0, 100.0, 100.5, 99.5)];
        let report = PositionSimulator::new(&config).run(&snaps, &[MtfFlags::UNKNOWN]);
        assert!(report.open_position.is_none());
        assert_eq!(report.signal_counts.total(), 0);
    }
}
