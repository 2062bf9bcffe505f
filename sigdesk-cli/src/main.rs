//! SigDesk CLI: single runs, parameter sweeps and synthetic data.
//!
//! Commands:
//! - `run`: classify and backtest one series from a TOML run config
//! - `sweep`: rank every point of the config's sweep grid
//! - `synth`: write a deterministic synthetic OHLCV series to CSV

use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use sigdesk_runner::data_loader::{generate_synthetic_candles, synthetic_epoch, write_candles_csv};
use sigdesk_runner::export::{
    export_json, export_stats_csv, export_trades_csv, format_summary, write_artifact,
};
use sigdesk_runner::{load_data, run_backtest, run_sweep, RunConfig, SweepReport};

#[derive(Parser)]
#[command(
    name = "sigdesk",
    about = "SigDesk CLI: multi-timeframe signal classification and backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest from a TOML config file.
    Run {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,

        /// Write the closed trades as CSV.
        #[arg(long)]
        trades_csv: Option<PathBuf>,

        /// Write the per-bucket stats as CSV.
        #[arg(long)]
        stats_csv: Option<PathBuf>,

        /// Write the full result as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Run every point of the config's sweep grid and rank them.
    Sweep {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,

        /// Number of ranked points to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Write the full sweep report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Generate a synthetic candle series.
    Synth {
        /// Symbol used to seed the generator.
        #[arg(long, default_value = "SYNTH")]
        symbol: String,

        /// Number of bars.
        #[arg(long, default_value_t = 2000)]
        bars: usize,

        /// Bar length in minutes.
        #[arg(long, default_value_t = 15)]
        timeframe_minutes: u32,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            trades_csv,
            stats_csv,
            json,
        } => run_cmd(config, trades_csv, stats_csv, json),
        Commands::Sweep { config, top, json } => sweep_cmd(config, top, json),
        Commands::Synth {
            symbol,
            bars,
            timeframe_minutes,
            out,
        } => synth_cmd(&symbol, bars, timeframe_minutes, out),
    }
}

fn run_cmd(
    config_path: PathBuf,
    trades_csv: Option<PathBuf>,
    stats_csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let config = RunConfig::load(&config_path)?;
    let result = run_backtest(&config)?;

    print!("{}", format_summary(&result));

    if let Some(path) = trades_csv {
        write_artifact(&path, &export_trades_csv(&result.trades)?)?;
        println!("Trades written to: {}", path.display());
    }
    if let Some(path) = stats_csv {
        write_artifact(&path, &export_stats_csv(&result.stats)?)?;
        println!("Stats written to: {}", path.display());
    }
    if let Some(path) = json {
        write_artifact(&path, &export_json(&result)?)?;
        println!("Result written to: {}", path.display());
    }
    Ok(())
}

fn sweep_cmd(config_path: PathBuf, top: usize, json: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::load(&config_path)?;
    let data = load_data(&config.data)
        .with_context(|| format!("failed to load data for {}", config.data.symbol))?;
    let report = run_sweep(&config.data.symbol, &data, &config.engine, &config.sweep)?;

    print_ranking(&report, top);

    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&report)?;
        write_artifact(&path, &text)?;
        println!("Sweep report written to: {}", path.display());
    }
    Ok(())
}

fn print_ranking(report: &SweepReport, top: usize) {
    println!(
        "{} completed, {} no result, {} invalid",
        report.ranked.len(),
        report.no_result_points,
        report.invalid_points
    );
    println!(
        "{:>4}  {:<12} {:>5} {:>6} {:>6} {:>11} {:>11} {:>6} {:>10} {:>7}",
        "#", "run", "weak", "sADX", "wADX", "strong SL/TP", "weak SL/TP", "trades", "total%", "pf"
    );
    for (rank, entry) in report.ranked.iter().take(top).enumerate() {
        let c = &entry.config;
        println!(
            "{:>4}  {:<12} {:>5} {:>6.1} {:>6.1} {:>5.2}/{:<5.2} {:>5.2}/{:<5.2} {:>6} {:>10.3} {:>7.2}",
            rank + 1,
            &entry.run_id[..entry.run_id.len().min(12)],
            c.classifier.weak_signals_enabled,
            c.classifier.strong_long.min_adx,
            c.classifier.weak_long.min_adx,
            c.risk.strong.stop_loss,
            c.risk.strong.take_profit,
            c.risk.weak.stop_loss,
            c.risk.weak.take_profit,
            entry.overall.trade_count,
            entry.overall.total_pnl_pct,
            entry.overall.profit_factor,
        );
    }
}

fn synth_cmd(symbol: &str, bars: usize, timeframe_minutes: u32, out: PathBuf) -> Result<()> {
    if bars == 0 || timeframe_minutes == 0 {
        bail!("--bars and --timeframe-minutes must be positive");
    }
    let period = Duration::minutes(i64::from(timeframe_minutes));
    let candles = generate_synthetic_candles(symbol, bars, synthetic_epoch(), period);
    write_candles_csv(&out, &candles)?;
    info!("wrote {} synthetic bars for {symbol}", candles.len());
    println!("Synthetic series written to: {}", out.display());
    Ok(())
}
