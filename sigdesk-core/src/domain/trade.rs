//! Trade: a closed position with entry traceability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::{Position, Side};
use super::signal::{Diagnostics, Strength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Stop,
    Target,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::Stop => "STOP",
            ExitReason::Target => "TARGET",
        }
    }
}

/// A complete round trip: entry → exit.
///
/// Carries the strength and diagnostics recorded at entry so the ledger can be
/// stratified without re-running the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub side: Side,
    pub strength: Strength,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Result ──
    pub pnl_pct: f64,
    pub bars_held: usize,

    // ── Entry diagnostics ──
    pub entry_diagnostics: Diagnostics,
}

impl Trade {
    /// Close `position` at `exit_price` on bar `exit_index`.
    pub fn close(
        position: &Position,
        exit_index: usize,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            side: position.side,
            strength: position.entry_signal.strength,
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
            exit_index,
            exit_time,
            exit_price,
            exit_reason,
            pnl_pct: position.pnl_pct(exit_price),
            bars_held: exit_index.saturating_sub(position.entry_index),
            entry_diagnostics: position.entry_signal.diagnostics,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_pct > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{Direction, SignalDecision};
    use chrono::{Duration, TimeZone};

    fn sample_trade() -> Trade {
        let entry_time = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let position = Position {
            side: Side::Long,
            entry_index: 4,
            entry_time,
            entry_price: 100.0,
            stop_loss: 97.0,
            take_profit: 106.0,
            entry_signal: SignalDecision::new(
                Direction::Long,
                Strength::Weak,
                Diagnostics {
                    rsi: 60.0,
                    atr: 2.0,
                    slope: 0.4,
                    adx: 21.0,
                    squeeze_on: false,
                    supertrend: None,
                },
            ),
        };
        Trade::close(
            &position,
            8,
            entry_time + Duration::hours(4),
            106.0,
            ExitReason::Target,
        )
    }

    #[test]
    fn close_copies_entry_context() {
        let trade = sample_trade();
        assert_eq!(trade.strength, Strength::Weak);
        assert_eq!(trade.bars_held, 4);
        assert!((trade.pnl_pct - 6.0).abs() < 1e-12);
        assert!(trade.is_winner());
        assert_eq!(trade.entry_diagnostics.adx, 21.0);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
