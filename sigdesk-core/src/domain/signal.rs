//! Signal decision types produced by the classifier.

use serde::{Deserialize, Serialize};

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
    None,
}

/// Conviction tier of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Strong,
    Weak,
    None,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
            Direction::None => "NONE",
        }
    }
}

impl Strength {
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Strong => "STRONG",
            Strength::Weak => "WEAK",
            Strength::None => "NONE",
        }
    }
}

/// Discrete direction of the trend-following overlay (Supertrend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// +1 / -1 encoding used in the trades CSV.
    pub fn as_sign(self) -> i8 {
        match self {
            TrendDirection::Up => 1,
            TrendDirection::Down => -1,
        }
    }
}

/// Indicator values that justified a decision, kept for sizing and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rsi: f64,
    pub atr: f64,
    pub slope: f64,
    pub adx: f64,
    pub squeeze_on: bool,
    #[serde(default)]
    pub supertrend: Option<TrendDirection>,
}

/// Classifier output for one bar.
///
/// Invariant: `strength == Strength::None` iff `direction == Direction::None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub direction: Direction,
    pub strength: Strength,
    pub diagnostics: Diagnostics,
}

impl SignalDecision {
    pub fn none(diagnostics: Diagnostics) -> Self {
        Self {
            direction: Direction::None,
            strength: Strength::None,
            diagnostics,
        }
    }

    pub fn new(direction: Direction, strength: Strength, diagnostics: Diagnostics) -> Self {
        debug_assert_eq!(
            direction == Direction::None,
            strength == Strength::None,
            "strength must be NONE exactly when direction is NONE"
        );
        Self {
            direction,
            strength,
            diagnostics,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::None
    }
}
