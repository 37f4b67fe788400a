//! Market data boundary.
//!
//! The engine treats data retrieval as a collaborator: a provider returns a
//! [`PriceSeries`] for `(symbol, period, interval)` and surfaces every
//! failure as an empty series, which the pipeline absorbs as empty outputs
//! and zeroed statistics. No retries, no caching here.

use alphalab_core::domain::{Bar, PriceSeries};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source of price series.
pub trait MarketDataProvider {
    /// Fetch bars for one dataset. Failures come back as an empty series.
    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> PriceSeries;
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("bad bar row: {0}")]
    BadRow(String),
    #[error("bars are not in strictly increasing timestamp order")]
    Unordered,
}

/// Reads OHLCV CSV files from a directory, one file per dataset, named
/// `<symbol>_<period>_<interval>.csv` with a
/// `timestamp,open,high,low,close,volume` header and RFC 3339 timestamps.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, period: &str, interval: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_{period}_{interval}.csv"))
    }
}

impl MarketDataProvider for CsvProvider {
    fn fetch(&self, symbol: &str, period: &str, interval: &str) -> PriceSeries {
        read_series(self.path_for(symbol, period, interval)).unwrap_or_else(|_| PriceSeries::empty())
    }
}

/// Parse one bar CSV file. Strict: any malformed row or out-of-order
/// timestamp fails the whole file (providers flatten that to empty).
pub fn read_series(path: impl AsRef<Path>) -> Result<PriceSeries, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();

    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("");
        let bad = || DataError::BadRow(row.iter().collect::<Vec<_>>().join(","));

        let timestamp: DateTime<Utc> = cell(0)
            .parse::<DateTime<Utc>>()
            .map_err(|_| bad())?;
        let mut fields = [0.0_f64; 5];
        for (slot, i) in fields.iter_mut().zip(1..=5) {
            *slot = cell(i).parse().map_err(|_| bad())?;
        }
        let [open, high, low, close, volume] = fields;

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    PriceSeries::new(bars).map_err(|_| DataError::Unordered)
}
