//! Export: JSON, CSV, and plain-text artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: flat trade ledger and per-bucket stats for external tools
//! - **Text**: the summary table printed by the CLI
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sigdesk_core::domain::{Trade, TrendDirection};

use crate::metrics::Stats;
use crate::runner::{BacktestResult, RunStatus, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade ledger as CSV, one flat row per trade with the entry
/// diagnostics spread into columns.
///
/// Floats use the shortest representation that parses back to the same
/// value. The overlay direction is written as +1 / -1, or 0 when undefined.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "strength",
        "entry_index",
        "entry_time",
        "entry_price",
        "stop_loss",
        "take_profit",
        "exit_index",
        "exit_time",
        "exit_price",
        "exit_reason",
        "pnl_pct",
        "bars_held",
        "rsi",
        "atr",
        "slope",
        "adx",
        "squeeze_on",
        "supertrend",
    ])?;

    for t in trades {
        let d = &t.entry_diagnostics;
        wtr.write_record([
            t.side.as_str(),
            t.strength.as_str(),
            &t.entry_index.to_string(),
            &t.entry_time.to_rfc3339(),
            &t.entry_price.to_string(),
            &t.stop_loss.to_string(),
            &t.take_profit.to_string(),
            &t.exit_index.to_string(),
            &t.exit_time.to_rfc3339(),
            &t.exit_price.to_string(),
            t.exit_reason.as_str(),
            &t.pnl_pct.to_string(),
            &t.bars_held.to_string(),
            &d.rsi.to_string(),
            &d.atr.to_string(),
            &d.slope.to_string(),
            &d.adx.to_string(),
            &d.squeeze_on.to_string(),
            &d.supertrend.map_or(0, TrendDirection::as_sign).to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export stats as CSV, one row per bucket (overall, strong, weak, long, short).
pub fn export_stats_csv(stats: &Stats) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "bucket",
        "trade_count",
        "win_count",
        "win_rate",
        "avg_pnl_pct",
        "total_pnl_pct",
        "profit_factor",
        "max_consecutive_losses",
    ])?;
    for (bucket, s) in stats.buckets() {
        wtr.write_record([
            bucket,
            &s.trade_count.to_string(),
            &s.win_count.to_string(),
            &s.win_rate.to_string(),
            &s.avg_pnl_pct.to_string(),
            &s.total_pnl_pct.to_string(),
            &s.profit_factor.to_string(),
            &s.max_consecutive_losses.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `contents` to `path`, naming the path on failure.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `BacktestResult` previously written with [`export_json`].
pub fn load_json(path: &Path) -> Result<BacktestResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Text summary ───────────────────────────────────────────────────

/// Human-readable summary of one run.
pub fn format_summary(result: &BacktestResult) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(
        out,
        "{} | run {} | {} bars ({} warm-up){}",
        result.symbol,
        &result.run_id[..result.run_id.len().min(12)],
        result.bar_count,
        result.warmup_bars,
        if result.synthetic { " | SYNTHETIC" } else { "" }
    );
    if let RunStatus::NoResult { reason } = &result.status {
        let _ = writeln!(out, "no result: {reason}");
        return out;
    }
    out.push_str(&format_stats_table(&result.stats));
    let _ = writeln!(
        out,
        "exits: {} stop / {} target",
        result.stats.stop_exits, result.stats.target_exits
    );
    if let Some(p) = &result.open_position {
        let _ = writeln!(
            out,
            "open: {} {} @ {:.4} since {}",
            p.entry_signal.strength.as_str(),
            p.side.as_str(),
            p.entry_price,
            p.entry_time.to_rfc3339()
        );
    }
    out
}

/// Fixed-width stats table, one line per bucket.
pub fn format_stats_table(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>6} {:>6} {:>8} {:>9} {:>10} {:>7} {:>7}",
        "bucket", "trades", "wins", "win%", "avg%", "total%", "pf", "maxL"
    );
    for (bucket, s) in stats.buckets() {
        let _ = writeln!(
            out,
            "{:<8} {:>6} {:>6} {:>8.2} {:>9.3} {:>10.3} {:>7.2} {:>7}",
            bucket,
            s.trade_count,
            s.win_count,
            s.win_rate * 100.0,
            s.avg_pnl_pct,
            s.total_pnl_pct,
            s.profit_factor,
            s.max_consecutive_losses
        );
    }
    out
}
