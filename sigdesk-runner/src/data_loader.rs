//! Candle loading for the runner.
//!
//! Reads `timestamp,open,high,low,close,volume` CSV files (RFC 3339 or epoch
//! millisecond timestamps; empty price fields become void candles), builds the
//! coarse series for trend alignment, and falls back to a deterministic
//! synthetic random walk when the config asks for it.
//!
//! Synthetic data is a developer-only mode. Results produced on it are tagged.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sigdesk_core::domain::{validate_series, Candle, CandleError};
use sigdesk_core::engine::CoarseSeries;
use thiserror::Error;

use crate::config::{CoarseSource, DataConfig};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },
    #[error("{origin} row {row}: unrecognised timestamp '{value}'")]
    Timestamp {
        origin: String,
        row: usize,
        value: String,
    },
    #[error("{origin} contains no candles")]
    Empty { origin: String },
    #[error("{origin}: {source}")]
    InvalidSeries {
        origin: String,
        #[source]
        source: CandleError,
    },
}

/// One CSV row. Missing prices are read as void.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Everything a run needs from the data layer.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub base: Vec<Candle>,
    pub base_period: Duration,
    pub near: Option<CoarseSeries>,
    pub far: Option<CoarseSeries>,
    /// BLAKE3 over every loaded candle, for provenance.
    pub dataset_hash: String,
    pub synthetic: bool,
}

/// Parse an RFC 3339 timestamp or integer epoch milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Read candles from any CSV source. `origin` names the source in errors.
pub fn read_candles<R: Read>(reader: R, origin: &str) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();
    for (row, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            origin: origin.to_string(),
            source,
        })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            origin: origin.to_string(),
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        candles.push(Candle {
            timestamp,
            open: record.open.unwrap_or(f64::NAN),
            high: record.high.unwrap_or(f64::NAN),
            low: record.low.unwrap_or(f64::NAN),
            close: record.close.unwrap_or(f64::NAN),
            volume: record.volume.unwrap_or(0.0),
        });
    }
    if candles.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }
    validate_series(&candles).map_err(|source| LoadError::InvalidSeries {
        origin: origin.to_string(),
        source,
    })?;
    Ok(candles)
}

pub fn load_candles_csv(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let candles = read_candles(file, &path.display().to_string())?;
    let voids = candles.iter().filter(|c| c.is_void()).count();
    if voids > 0 {
        warn!("{}: {voids} void candles", path.display());
    }
    Ok(candles)
}

/// Write candles as CSV with RFC 3339 timestamps.
pub fn write_candles<W: Write>(writer: W, candles: &[Candle]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for c in candles {
        let finite = |v: f64| (!v.is_nan()).then_some(v);
        wtr.serialize(CsvRow {
            timestamp: c.timestamp.to_rfc3339(),
            open: finite(c.open),
            high: finite(c.high),
            low: finite(c.low),
            close: finite(c.close),
            volume: Some(c.volume),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_candles_csv(path: &Path, candles: &[Candle]) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_candles(file, candles).map_err(|source| LoadError::Csv {
        origin: path.display().to_string(),
        source,
    })
}

/// Generate a deterministic random walk for `symbol`.
///
/// The drift switches regime every 100 bars so the series contains both
/// trending and ranging stretches.
pub fn generate_synthetic_candles(
    symbol: &str,
    bars: usize,
    start: DateTime<Utc>,
    period: Duration,
) -> Vec<Candle> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut price = 30_000.0_f64;
    let mut drift = 0.0;
    let mut timestamp = start;
    let mut candles = Vec::with_capacity(bars);
    for i in 0..bars {
        if i % 100 == 0 {
            drift = rng.gen_range(-0.0015..0.0015);
        }
        let ret: f64 = drift + rng.gen_range(-0.004..0.004);
        let open = price;
        let close = (price * (1.0 + ret)).max(1.0);
        candles.push(Candle {
            timestamp,
            open,
            high: open.max(close) * (1.0 + rng.gen_range(0.0..0.002)),
            low: open.min(close) * (1.0 - rng.gen_range(0.0..0.002)),
            close,
            volume: rng.gen_range(10.0..500.0),
        });
        price = close;
        timestamp += period;
    }
    candles
}

/// Default origin for synthetic series.
pub fn synthetic_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn minutes(m: u32) -> Duration {
    Duration::minutes(i64::from(m))
}

fn load_coarse(
    source: CoarseSource<'_>,
    base: &[Candle],
    base_period: Duration,
) -> Result<Option<CoarseSeries>, LoadError> {
    Ok(match source {
        CoarseSource::File { path, minutes: m } => {
            Some(CoarseSeries::new(load_candles_csv(path)?, minutes(m)))
        }
        CoarseSource::Resampled { factor } => {
            let series = CoarseSeries::from_base(base, base_period, factor);
            if series.is_empty() {
                warn!(
                    "resample factor {factor} leaves no complete coarse bar over {} base bars, \
                     treating the series as absent",
                    base.len()
                );
                return Ok(None);
            }
            Some(series)
        }
        CoarseSource::Absent => None,
    })
}

/// Load the base and coarse series described by `config`.
pub fn load_data(config: &DataConfig) -> Result<LoadedData, LoadError> {
    let base_period = minutes(config.timeframe_minutes);
    let (base, synthetic) = match (&config.base, config.synthetic) {
        (Some(path), false) => (load_candles_csv(path)?, false),
        (_, true) => {
            warn!(
                "generating synthetic data for {}, results will be tagged as synthetic",
                config.symbol
            );
            let candles = generate_synthetic_candles(
                &config.symbol,
                config.synthetic_bars,
                synthetic_epoch(),
                base_period,
            );
            (candles, true)
        }
        (None, false) => {
            return Err(LoadError::Empty {
                origin: format!("[data] for {}", config.symbol),
            })
        }
    };

    let near = load_coarse(config.near_source(), &base, base_period)?;
    let far = load_coarse(config.far_source(), &base, base_period)?;
    let dataset_hash = compute_dataset_hash(&base, near.as_ref(), far.as_ref());
    info!(
        "loaded {} base candles for {} (near: {}, far: {})",
        base.len(),
        config.symbol,
        near.as_ref().map_or(0, |s| s.candles.len()),
        far.as_ref().map_or(0, |s| s.candles.len()),
    );

    Ok(LoadedData {
        base,
        base_period,
        near,
        far,
        dataset_hash,
        synthetic,
    })
}

/// Deterministic BLAKE3 hash over timestamps and OHLCV of every series.
fn compute_dataset_hash(
    base: &[Candle],
    near: Option<&CoarseSeries>,
    far: Option<&CoarseSeries>,
) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut feed = |tag: &[u8], candles: &[Candle]| {
        hasher.update(tag);
        for c in candles {
            hasher.update(&c.timestamp.timestamp_millis().to_le_bytes());
            for v in [c.open, c.high, c.low, c.close, c.volume] {
                hasher.update(&v.to_le_bytes());
            }
        }
    };
    feed(b"base", base);
    if let Some(s) = near {
        feed(b"near", &s.candles);
    }
    if let Some(s) = far {
        feed(b"far", &s.candles);
    }
    hasher.finalize().to_hex().to_string()
}
