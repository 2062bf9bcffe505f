//! Performance aggregation: a pure reduction over the trade ledger.
//!
//! Every figure is computed from percentage PnL per trade; there is no equity
//! curve or position sizing at this layer. An empty ledger yields zeroed
//! stats, never an error.

use serde::{Deserialize, Serialize};
use sigdesk_core::domain::{ExitReason, Side, Strength, Trade};

/// Cap for profit factor when there are no losing trades.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Metrics for one slice of the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub trade_count: usize,
    pub win_count: usize,
    /// Fraction of winners in 0..=1.
    pub win_rate: f64,
    pub avg_pnl_pct: f64,
    pub total_pnl_pct: f64,
    pub profit_factor: f64,
    pub max_consecutive_losses: usize,
}

impl TierStats {
    /// Reduce any ordered selection of trades.
    pub fn from_trades<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut stats = Self::default();
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut losing_streak = 0;

        for trade in trades {
            stats.trade_count += 1;
            stats.total_pnl_pct += trade.pnl_pct;
            if trade.is_winner() {
                stats.win_count += 1;
                gross_profit += trade.pnl_pct;
                losing_streak = 0;
            } else {
                gross_loss += trade.pnl_pct.abs();
                losing_streak += 1;
                stats.max_consecutive_losses = stats.max_consecutive_losses.max(losing_streak);
            }
        }

        if stats.trade_count > 0 {
            stats.win_rate = stats.win_count as f64 / stats.trade_count as f64;
            stats.avg_pnl_pct = stats.total_pnl_pct / stats.trade_count as f64;
            stats.profit_factor = profit_factor(gross_profit, gross_loss);
        }
        stats
    }
}

/// Gross profit over gross loss, capped at [`PROFIT_FACTOR_CAP`].
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

/// Ledger summary, overall and stratified by entry strength and side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub overall: TierStats,
    pub strong: TierStats,
    pub weak: TierStats,
    pub long: TierStats,
    pub short: TierStats,
    pub stop_exits: usize,
    pub target_exits: usize,
}

impl Stats {
    pub fn compute(trades: &[Trade]) -> Self {
        Self {
            overall: TierStats::from_trades(trades),
            strong: TierStats::from_trades(
                trades.iter().filter(|t| t.strength == Strength::Strong),
            ),
            weak: TierStats::from_trades(trades.iter().filter(|t| t.strength == Strength::Weak)),
            long: TierStats::from_trades(trades.iter().filter(|t| t.side == Side::Long)),
            short: TierStats::from_trades(trades.iter().filter(|t| t.side == Side::Short)),
            stop_exits: trades
                .iter()
                .filter(|t| t.exit_reason == ExitReason::Stop)
                .count(),
            target_exits: trades
                .iter()
                .filter(|t| t.exit_reason == ExitReason::Target)
                .count(),
        }
    }

    /// Buckets in export order with their labels.
    pub fn buckets(&self) -> [(&'static str, &TierStats); 5] {
        [
            ("overall", &self.overall),
            ("strong", &self.strong),
            ("weak", &self.weak),
            ("long", &self.long),
            ("short", &self.short),
        ]
    }
}
