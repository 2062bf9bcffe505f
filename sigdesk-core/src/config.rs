//! Engine configuration.
//!
//! A single immutable value threaded through every run. Each section has the
//! reference defaults and `#[serde(default)]`, so a TOML document may override
//! any subset. `validate()` must pass before a run starts; `Backtest::new`
//! enforces this.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Strength;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be >= 1")]
    ZeroPeriod { field: &'static str },
    #[error("EMA horizons must satisfy fast < slow < trend (got {fast}/{slow}/{trend})")]
    EmaOrdering {
        fast: usize,
        slow: usize,
        trend: usize,
    },
    #[error("{field} must be a positive finite number (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must lie within 0..=100 (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{tier} slope threshold {strong} must be at least as demanding as the weak one {weak}")]
    SlopeOrdering {
        tier: &'static str,
        strong: f64,
        weak: f64,
    },
}

/// Indicator lookbacks and band parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub squeeze_bb_period: usize,
    pub squeeze_bb_multiplier: f64,
    pub squeeze_kc_period: usize,
    pub squeeze_kc_multiplier: f64,
    /// Maximum window for the fast-EMA slope.
    pub slope_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            ema_trend: 200,
            rsi_period: 14,
            atr_period: 14,
            adx_period: 14,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            squeeze_bb_period: 20,
            squeeze_bb_multiplier: 2.0,
            squeeze_kc_period: 20,
            squeeze_kc_multiplier: 1.5,
            slope_window: 5,
        }
    }
}

/// Multi-timeframe alignment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MtfParams {
    /// When false every bar is treated as aligned in both directions.
    pub enabled: bool,
    /// EMA horizon applied to the nearer coarse series.
    pub near_ema: usize,
    /// EMA horizon applied to the farther coarse series.
    pub far_ema: usize,
}

impl Default for MtfParams {
    fn default() -> Self {
        Self {
            enabled: true,
            near_ema: 20,
            far_ema: 50,
        }
    }
}

/// Thresholds for one (direction, strength) tier.
///
/// For long tiers `slope` is a floor and `oscillator` a cap; for short tiers
/// `slope` is a ceiling (negative) and `oscillator` a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierGate {
    pub slope: f64,
    pub oscillator: f64,
    pub min_adx: f64,
}

/// Classifier switches and tier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// When false the classifier collapses to a binary decision using the
    /// STRONG gates only.
    pub classification_enabled: bool,
    pub weak_signals_enabled: bool,
    pub strong_long: TierGate,
    pub weak_long: TierGate,
    pub strong_short: TierGate,
    pub weak_short: TierGate,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            classification_enabled: true,
            weak_signals_enabled: true,
            strong_long: TierGate {
                slope: 1.0,
                oscillator: 55.0,
                min_adx: 25.0,
            },
            weak_long: TierGate {
                slope: 0.2,
                oscillator: 65.0,
                min_adx: 20.0,
            },
            strong_short: TierGate {
                slope: -1.0,
                oscillator: 45.0,
                min_adx: 25.0,
            },
            weak_short: TierGate {
                slope: -0.2,
                oscillator: 35.0,
                min_adx: 20.0,
            },
        }
    }
}

/// Stop-loss / take-profit distances in ATR units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMultipliers {
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub strong: RiskMultipliers,
    pub weak: RiskMultipliers,
    /// Used when classification is disabled.
    pub default: RiskMultipliers,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            strong: RiskMultipliers {
                stop_loss: 1.5,
                take_profit: 3.0,
            },
            weak: RiskMultipliers {
                stop_loss: 2.0,
                take_profit: 4.0,
            },
            default: RiskMultipliers {
                stop_loss: 2.0,
                take_profit: 3.0,
            },
        }
    }
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorParams,
    pub mtf: MtfParams,
    pub classifier: ClassifierConfig,
    pub risk: RiskConfig,
    /// Leading bars that are never entered or exited.
    pub warmup_bars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorParams::default(),
            mtf: MtfParams::default(),
            classifier: ClassifierConfig::default(),
            risk: RiskConfig::default(),
            warmup_bars: 210,
        }
    }
}

impl EngineConfig {
    /// Multiplier pair for an entry of the given strength.
    pub fn multipliers_for(&self, strength: Strength) -> RiskMultipliers {
        if !self.classifier.classification_enabled {
            return self.risk.default;
        }
        match strength {
            Strength::Weak => self.risk.weak,
            Strength::Strong | Strength::None => self.risk.strong,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        for (field, value) in [
            ("indicators.ema_fast", ind.ema_fast),
            ("indicators.ema_slow", ind.ema_slow),
            ("indicators.ema_trend", ind.ema_trend),
            ("indicators.rsi_period", ind.rsi_period),
            ("indicators.atr_period", ind.atr_period),
            ("indicators.adx_period", ind.adx_period),
            ("indicators.supertrend_period", ind.supertrend_period),
            ("indicators.squeeze_bb_period", ind.squeeze_bb_period),
            ("indicators.squeeze_kc_period", ind.squeeze_kc_period),
            ("indicators.slope_window", ind.slope_window),
            ("mtf.near_ema", self.mtf.near_ema),
            ("mtf.far_ema", self.mtf.far_ema),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroPeriod { field });
            }
        }
        if !(ind.ema_fast < ind.ema_slow && ind.ema_slow < ind.ema_trend) {
            return Err(ConfigError::EmaOrdering {
                fast: ind.ema_fast,
                slow: ind.ema_slow,
                trend: ind.ema_trend,
            });
        }
        for (field, value) in [
            ("indicators.supertrend_multiplier", ind.supertrend_multiplier),
            ("indicators.squeeze_bb_multiplier", ind.squeeze_bb_multiplier),
            ("indicators.squeeze_kc_multiplier", ind.squeeze_kc_multiplier),
            ("risk.strong.stop_loss", self.risk.strong.stop_loss),
            ("risk.strong.take_profit", self.risk.strong.take_profit),
            ("risk.weak.stop_loss", self.risk.weak.stop_loss),
            ("risk.weak.take_profit", self.risk.weak.take_profit),
            ("risk.default.stop_loss", self.risk.default.stop_loss),
            ("risk.default.take_profit", self.risk.default.take_profit),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let cls = &self.classifier;
        for (name, gate) in [
            ("classifier.strong_long", &cls.strong_long),
            ("classifier.weak_long", &cls.weak_long),
            ("classifier.strong_short", &cls.strong_short),
            ("classifier.weak_short", &cls.weak_short),
        ] {
            validate_gate(name, gate)?;
        }
        if cls.strong_long.slope < cls.weak_long.slope {
            return Err(ConfigError::SlopeOrdering {
                tier: "long",
                strong: cls.strong_long.slope,
                weak: cls.weak_long.slope,
            });
        }
        if cls.strong_short.slope > cls.weak_short.slope {
            return Err(ConfigError::SlopeOrdering {
                tier: "short",
                strong: cls.strong_short.slope,
                weak: cls.weak_short.slope,
            });
        }
        Ok(())
    }
}

fn validate_gate(name: &'static str, gate: &TierGate) -> Result<(), ConfigError> {
    if !gate.slope.is_finite() {
        return Err(ConfigError::NotFinite {
            field: name,
            value: gate.slope,
        });
    }
    if !(0.0..=100.0).contains(&gate.oscillator) {
        return Err(ConfigError::OutOfRange {
            field: name,
            value: gate.oscillator,
        });
    }
    if !(0.0..=100.0).contains(&gate.min_adx) {
        return Err(ConfigError::OutOfRange {
            field: name,
            value: gate.min_adx,
        });
    }
    Ok(())
}
