//! Price sources and structured error types.
//!
//! The `PriceSource` trait abstracts over where an asset's history comes from
//! (CSV export, synthetic generator) so the loader can swap implementations
//! and tests can mock them. Network providers are deliberately absent: the
//! engine expects data that has already been fetched.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use dcalab_core::domain::{AssetSeries, PricePoint};
use dcalab_core::EngineError;
use thiserror::Error;
use tracing::debug;

use crate::config::{AssetKind, AssetSpec};

/// Errors from loading one asset's price history.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("asset '{asset}' has no price file configured")]
    NoPath { asset: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("no price rows for '{asset}'")]
    NoData { asset: String },

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Anything that can hand over a daily price history for an asset.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Load the asset's history at daily granularity.
    fn load(&self, asset: &AssetSpec) -> Result<AssetSeries, SourceError>;
}

// ── CSV ──────────────────────────────────────────────────────────────

/// Reads `date,price` CSV files.
///
/// Header names are matched case-insensitively. The price column is the first
/// of `price`, `adj_close`, `adj close`, `close` present, so adjusted closes win
/// over raw ones; `time`/`timestamp` are accepted in place of `date`.
/// Timestamps may be dates (`YYYY-MM-DD` or `YYYYMMDD`), RFC 3339,
/// `YYYY-MM-DD HH:MM:SS`, or epoch milliseconds. Several rows on one day
/// collapse to the latest one.
#[derive(Debug, Default, Clone)]
pub struct CsvSource;

const DATE_COLUMNS: [&str; 3] = ["date", "time", "timestamp"];
const PRICE_COLUMNS: [&str; 4] = ["price", "adj_close", "adj close", "close"];

impl CsvSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV file into a daily series labelled `asset`.
    pub fn read_path(&self, asset: &str, path: &Path) -> Result<AssetSeries, SourceError> {
        let file = std::fs::File::open(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read(asset, path, file)
    }

    /// Parse CSV from any reader. `path` is only used in error messages.
    pub fn read<R: std::io::Read>(
        &self,
        asset: &str,
        path: &Path,
        reader: R,
    ) -> Result<AssetSeries, SourceError> {
        let csv_err = |source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().map_err(csv_err)?.clone();
        // Candidates are in priority order; header order does not matter.
        let find = |candidates: &[&str], label: &str| {
            candidates
                .iter()
                .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
                .ok_or_else(|| SourceError::MissingColumn {
                    path: path.to_path_buf(),
                    column: label.to_string(),
                })
        };
        let date_idx = find(&DATE_COLUMNS[..], "date")?;
        let price_idx = find(&PRICE_COLUMNS[..], "price")?;

        let mut rows: Vec<(NaiveDateTime, f64)> = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            // Header is line 1.
            let line = i as u64 + 2;
            let parse_err = |reason: String| SourceError::Parse {
                path: path.to_path_buf(),
                line,
                reason,
            };

            let raw_price = record.get(price_idx).unwrap_or("");
            if raw_price.is_empty() {
                continue;
            }
            let price: f64 = raw_price
                .parse()
                .map_err(|e| parse_err(format!("price '{raw_price}': {e}")))?;
            let raw_date = record.get(date_idx).unwrap_or("");
            let timestamp = parse_timestamp(raw_date)
                .ok_or_else(|| parse_err(format!("unrecognised date '{raw_date}'")))?;
            rows.push((timestamp, price));
        }

        if rows.is_empty() {
            return Err(SourceError::NoData {
                asset: asset.to_string(),
            });
        }

        // Order by full timestamp so the last row of each day is its latest tick.
        rows.sort_by_key(|(ts, _)| *ts);
        let total = rows.len();
        let points = rows
            .into_iter()
            .map(|(ts, price)| PricePoint::new(ts.date(), price))
            .collect();
        let series = AssetSeries::from_unordered(asset, points)?;

        debug!(
            asset,
            path = %path.display(),
            rows = total,
            days = series.len(),
            "loaded CSV price history"
        );
        Ok(series)
    }
}

impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, asset: &AssetSpec) -> Result<AssetSeries, SourceError> {
        let path = asset.path.as_deref().ok_or_else(|| SourceError::NoPath {
            asset: asset.display_name.clone(),
        })?;
        self.read_path(&asset.display_name, path)
    }
}

/// Parse the timestamp formats seen in exported price histories.
///
/// Bare digit strings are `YYYYMMDD` when eight long; epoch milliseconds need
/// at least eleven digits.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if raw.len() == 8 {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y%m%d") {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if raw.len() < 11 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
}

// ── Synthetic ────────────────────────────────────────────────────────

/// Deterministic random-walk prices for demos and tests.
///
/// The seed is derived from the symbol, so the same symbol always yields the
/// same path. Tickers skip weekends; crypto trades every day.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SyntheticSource {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self, asset: &AssetSpec) -> Result<AssetSeries, SourceError> {
        let points = synthetic_points(&asset.symbol, asset.kind, self.start, self.end);
        if points.is_empty() {
            return Err(SourceError::NoData {
                asset: asset.display_name.clone(),
            });
        }
        Ok(AssetSeries::new(&asset.display_name, points)?)
    }
}

fn synthetic_points(symbol: &str, kind: AssetKind, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut price = 100.0_f64;
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| kind == AssetKind::Crypto || !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            let daily_return: f64 = rng.gen_range(-0.03..0.031);
            price *= 1.0 + daily_return;
            PricePoint::new(day, price)
        })
        .collect()
}
