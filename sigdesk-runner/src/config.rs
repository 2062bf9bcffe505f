//! TOML run configuration.
//!
//! ```toml
//! [data]
//! symbol = "BTCUSDT"
//! base = "data/btc_15m.csv"
//! timeframe_minutes = 15
//! near_factor = 4        # 1h bars resampled from the base series
//! far = "data/btc_4h.csv"
//! far_minutes = 240
//!
//! [engine]
//! warmup_bars = 210
//!
//! [engine.classifier]
//! weak_signals_enabled = true
//!
//! [sweep]
//! strong_min_adx = [20.0, 25.0]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sigdesk_core::config::{ConfigError, EngineConfig};
use thiserror::Error;

use crate::sweep::SweepGrid;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("[data] needs a `base` CSV path or `synthetic = true`")]
    NoDataSource,
    #[error("[data] {field} must be >= 1")]
    ZeroField { field: &'static str },
    #[error("[data] {field} = {value} exceeds {max}", max = MAX_RESAMPLE_FACTOR)]
    FactorTooLarge { field: &'static str, value: usize },
    #[error("engine config: {0}")]
    Engine(#[from] ConfigError),
}

/// Largest accepted `near_factor` / `far_factor`.
pub const MAX_RESAMPLE_FACTOR: usize = 10_000;

/// Where a coarse series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoarseSource<'a> {
    File { path: &'a Path, minutes: u32 },
    Resampled { factor: usize },
    Absent,
}

/// The `[data]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub symbol: String,
    /// Base-timeframe candle CSV.
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default = "default_timeframe_minutes")]
    pub timeframe_minutes: u32,
    /// Generate a deterministic random walk instead of reading `base`.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default = "default_synthetic_bars")]
    pub synthetic_bars: usize,

    #[serde(default)]
    pub near: Option<PathBuf>,
    #[serde(default = "default_near_minutes")]
    pub near_minutes: u32,
    /// Resample the base series by this factor when `near` is not given.
    #[serde(default)]
    pub near_factor: Option<usize>,

    #[serde(default)]
    pub far: Option<PathBuf>,
    #[serde(default = "default_far_minutes")]
    pub far_minutes: u32,
    #[serde(default)]
    pub far_factor: Option<usize>,
}

fn default_timeframe_minutes() -> u32 {
    15
}

fn default_synthetic_bars() -> usize {
    2_000
}

fn default_near_minutes() -> u32 {
    60
}

fn default_far_minutes() -> u32 {
    240
}

impl DataConfig {
    /// Synthetic data for `symbol` with default sizes and no coarse series.
    pub fn synthetic(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            base: None,
            timeframe_minutes: default_timeframe_minutes(),
            synthetic: true,
            synthetic_bars: default_synthetic_bars(),
            near: None,
            near_minutes: default_near_minutes(),
            near_factor: None,
            far: None,
            far_minutes: default_far_minutes(),
            far_factor: None,
        }
    }

    pub fn near_source(&self) -> CoarseSource<'_> {
        coarse_source(self.near.as_deref(), self.near_minutes, self.near_factor)
    }

    pub fn far_source(&self) -> CoarseSource<'_> {
        coarse_source(self.far.as_deref(), self.far_minutes, self.far_factor)
    }

    fn validate(&self) -> Result<(), RunConfigError> {
        if self.base.is_none() && !self.synthetic {
            return Err(RunConfigError::NoDataSource);
        }
        for (field, value) in [
            ("timeframe_minutes", self.timeframe_minutes as usize),
            ("near_minutes", self.near_minutes as usize),
            ("far_minutes", self.far_minutes as usize),
            ("near_factor", self.near_factor.unwrap_or(1)),
            ("far_factor", self.far_factor.unwrap_or(1)),
        ] {
            if value == 0 {
                return Err(RunConfigError::ZeroField { field });
            }
        }
        for (field, factor) in [
            ("near_factor", self.near_factor),
            ("far_factor", self.far_factor),
        ] {
            if let Some(value) = factor.filter(|&f| f > MAX_RESAMPLE_FACTOR) {
                return Err(RunConfigError::FactorTooLarge { field, value });
            }
        }
        if self.synthetic && self.synthetic_bars == 0 {
            return Err(RunConfigError::ZeroField {
                field: "synthetic_bars",
            });
        }
        Ok(())
    }
}

fn coarse_source(path: Option<&Path>, minutes: u32, factor: Option<usize>) -> CoarseSource<'_> {
    match (path, factor) {
        (Some(path), _) => CoarseSource::File { path, minutes },
        (None, Some(factor)) => CoarseSource::Resampled { factor },
        (None, None) => CoarseSource::Absent,
    }
}

/// A complete, reproducible run description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Grid used by `sigdesk sweep`; the base point is `engine`.
    #[serde(default)]
    pub sweep: SweepGrid,
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, RunConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, RunConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.data.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// BLAKE3 over the canonical JSON encoding of `value`.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(blake3::hash(&json).to_hex().to_string())
}

/// Identifier of one run: the same symbol, data and engine config always map
/// to the same id.
pub fn run_id(
    symbol: &str,
    dataset_hash: &str,
    engine: &EngineConfig,
) -> Result<String, serde_json::Error> {
    fingerprint(&(symbol, dataset_hash, engine))
}
