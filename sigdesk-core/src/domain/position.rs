//! Open simulated position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{Direction, SignalDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Long => Some(Side::Long),
            Direction::Short => Some(Side::Short),
            Direction::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

/// A single open position. Stop and target are fixed at entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_signal: SignalDecision,
}

impl Position {
    /// Percentage PnL if the position were closed at `exit_price`.
    pub fn pnl_pct(&self, exit_price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        let raw = match self.side {
            Side::Long => exit_price - self.entry_price,
            Side::Short => self.entry_price - exit_price,
        };
        raw / self.entry_price * 100.0
    }
}
