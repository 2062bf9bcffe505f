//! Parameter sweep over classifier and risk settings.
//!
//! Every grid point is a complete, independently validated `EngineConfig`
//! value. Points share the loaded candles read-only and run in parallel.

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sigdesk_core::config::{EngineConfig, RiskMultipliers};

use crate::data_loader::LoadedData;
use crate::metrics::TierStats;
use crate::runner::{run_backtest_from_data, BacktestResult, RunError};

/// Values to try for each swept setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepGrid {
    pub weak_signals: Vec<bool>,
    pub strong_min_adx: Vec<f64>,
    pub weak_min_adx: Vec<f64>,
    pub strong_risk: Vec<RiskMultipliers>,
    pub weak_risk: Vec<RiskMultipliers>,
}

impl Default for SweepGrid {
    fn default() -> Self {
        let pair = |stop_loss, take_profit| RiskMultipliers {
            stop_loss,
            take_profit,
        };
        Self {
            weak_signals: vec![true, false],
            strong_min_adx: vec![20.0, 25.0, 30.0],
            weak_min_adx: vec![15.0, 20.0],
            strong_risk: vec![pair(1.5, 3.0), pair(1.0, 2.0), pair(2.0, 4.0)],
            weak_risk: vec![pair(2.0, 4.0), pair(1.5, 3.0)],
        }
    }
}

impl SweepGrid {
    /// Upper bound on the number of points (before deduplication and validation).
    pub fn size(&self) -> usize {
        self.weak_signals.len()
            * self.strong_min_adx.len()
            * self.weak_min_adx.len()
            * self.strong_risk.len()
            * self.weak_risk.len()
    }

    /// All valid configurations derived from `base`, plus the number of
    /// points rejected by validation.
    ///
    /// With weak signals disabled the weak-only dimensions are irrelevant, so
    /// only their first value is used.
    pub fn generate(&self, base: &EngineConfig) -> (Vec<EngineConfig>, usize) {
        let mut configs = Vec::new();
        let mut invalid = 0;

        for &weak in &self.weak_signals {
            let weak_adx: &[f64] = if weak {
                &self.weak_min_adx
            } else {
                first(&self.weak_min_adx)
            };
            let weak_risk: &[RiskMultipliers] = if weak {
                &self.weak_risk
            } else {
                first(&self.weak_risk)
            };
            for &strong_adx in &self.strong_min_adx {
                for &weak_adx in weak_adx {
                    for &strong_risk in &self.strong_risk {
                        for &weak_risk in weak_risk {
                            let mut config = base.clone();
                            config.classifier.weak_signals_enabled = weak;
                            config.classifier.strong_long.min_adx = strong_adx;
                            config.classifier.strong_short.min_adx = strong_adx;
                            config.classifier.weak_long.min_adx = weak_adx;
                            config.classifier.weak_short.min_adx = weak_adx;
                            config.risk.strong = strong_risk;
                            config.risk.weak = weak_risk;
                            match config.validate() {
                                Ok(()) => configs.push(config),
                                Err(e) => {
                                    warn!("skipping sweep point: {e}");
                                    invalid += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
        (configs, invalid)
    }
}

fn first<T>(values: &[T]) -> &[T] {
    &values[..values.len().min(1)]
}

/// One completed sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub run_id: String,
    pub config: EngineConfig,
    pub overall: TierStats,
    pub strong: TierStats,
    pub weak: TierStats,
}

impl SweepEntry {
    fn from_result(config: EngineConfig, result: &BacktestResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            config,
            overall: result.stats.overall,
            strong: result.stats.strong,
            weak: result.stats.weak,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Completed points, best total PnL% first.
    pub ranked: Vec<SweepEntry>,
    /// Points rejected by config validation.
    pub invalid_points: usize,
    /// Points whose run produced no result.
    pub no_result_points: usize,
}

/// Run every grid point against the same data in parallel.
pub fn run_sweep(
    symbol: &str,
    data: &LoadedData,
    base: &EngineConfig,
    grid: &SweepGrid,
) -> Result<SweepReport, RunError> {
    let (configs, invalid_points) = grid.generate(base);
    info!(
        "sweeping {} points for {symbol} ({invalid_points} invalid)",
        configs.len()
    );

    let results: Vec<(EngineConfig, BacktestResult)> = configs
        .into_par_iter()
        .map(|config| {
            let result = run_backtest_from_data(symbol, data, &config)?;
            Ok((config, result))
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    let mut no_result_points = 0;
    let mut ranked = Vec::with_capacity(results.len());
    for (config, result) in &results {
        if result.is_completed() {
            ranked.push(SweepEntry::from_result(config.clone(), result));
        } else {
            no_result_points += 1;
        }
    }
    rank(&mut ranked);

    Ok(SweepReport {
        ranked,
        invalid_points,
        no_result_points,
    })
}

/// Sort by total PnL% descending, ties broken by run id ascending.
fn rank(entries: &mut [SweepEntry]) {
    entries.sort_by(|a, b| {
        b.overall
            .total_pnl_pct
            .total_cmp(&a.overall.total_pnl_pct)
            .then_with(|| a.run_id.cmp(&b.run_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;
    use crate::data_loader::load_data;

    #[test]
    fn weak_disabled_collapses_weak_dimensions() {
        let grid = SweepGrid::default();
        let (configs, invalid) = grid.generate(&EngineConfig::default());
        assert_eq!(invalid, 0);
        // weak on: 3 * 2 * 3 * 2 = 36; weak off: 3 * 1 * 3 * 1 = 9
        assert_eq!(configs.len(), 45);
        assert_eq!(grid.size(), 72);
        assert_eq!(
            configs
                .iter()
                .filter(|c| !c.classifier.weak_signals_enabled)
                .count(),
            9
        );
    }

    #[test]
    fn invalid_points_counted_not_run() {
        let grid = SweepGrid {
            weak_signals: vec![true],
            strong_min_adx: vec![25.0, 150.0],
            weak_min_adx: vec![20.0],
            strong_risk: vec![RiskMultipliers {
                stop_loss: 1.5,
                take_profit: 3.0,
            }],
            weak_risk: vec![RiskMultipliers {
                stop_loss: 2.0,
                take_profit: 4.0,
            }],
        };
        let (configs, invalid) = grid.generate(&EngineConfig::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(invalid, 1);
    }

    #[test]
    fn ranking_orders_by_total_then_run_id() {
        let entry = |id: &str, total: f64| SweepEntry {
            run_id: id.to_string(),
            config: EngineConfig::default(),
            overall: TierStats {
                total_pnl_pct: total,
                ..TierStats::default()
            },
            strong: TierStats::default(),
            weak: TierStats::default(),
        };
        let mut entries = vec![entry("c", 1.0), entry("b", 5.0), entry("a", 1.0)];
        rank(&mut entries);
        let ids: Vec<&str> = entries.iter().map(|e| e.run_id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn sweep_over_synthetic_data() {
        let mut data_config = DataConfig::synthetic("SWEEP");
        data_config.synthetic_bars = 600;
        let data = load_data(&data_config).unwrap();
        let grid = SweepGrid {
            strong_min_adx: vec![20.0, 30.0],
            ..SweepGrid::default()
        };
        let report = run_sweep("SWEEP", &data, &EngineConfig::default(), &grid).unwrap();
        let (expected, _) = grid.generate(&EngineConfig::default());
        assert_eq!(report.ranked.len() + report.no_result_points, expected.len());
        assert!(report
            .ranked
            .windows(2)
            .all(|w| w[0].overall.total_pnl_pct >= w[1].overall.total_pnl_pct));
    }

    #[test]
    fn short_data_yields_only_no_results() {
        let mut data_config = DataConfig::synthetic("SHORT");
        data_config.synthetic_bars = 50;
        let data = load_data(&data_config).unwrap();
        let grid = SweepGrid {
            weak_signals: vec![false],
            ..SweepGrid::default()
        };
        let report = run_sweep("SHORT", &data, &EngineConfig::default(), &grid).unwrap();
        assert!(report.ranked.is_empty());
        assert_eq!(report.no_result_points, 9);
    }
}
