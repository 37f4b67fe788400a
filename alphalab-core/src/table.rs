//! IndicatorTable — a price series plus memoized indicator columns.
//!
//! Columns are append-only and idempotent: once a `(kind, window)` key has
//! been computed it is returned unchanged on every later fetch, never
//! recomputed. The optimizer materializes every reachable column eagerly and
//! then shares the table read-only across worker threads, so the mutable
//! fetch path is never exercised under concurrency.

use crate::domain::PriceSeries;
use crate::error::CoreError;
use crate::indicators::{self, IndicatorKey};
use std::collections::HashMap;

/// Close column plus memoized indicator columns, all of series length.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    closes: Vec<f64>,
    columns: HashMap<IndicatorKey, Vec<f64>>,
}

impl IndicatorTable {
    pub fn new(series: &PriceSeries) -> Self {
        Self {
            closes: series.closes(),
            columns: HashMap::new(),
        }
    }

    /// Number of bars backing the table.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Idempotent insert: compute the column unless it already exists, then
    /// return it.
    pub fn fetch(&mut self, key: IndicatorKey) -> &[f64] {
        self.columns
            .entry(key)
            .or_insert_with(|| indicators::compute(key, &self.closes))
    }

    /// Eagerly compute a set of columns.
    pub fn materialize(&mut self, keys: &[IndicatorKey]) {
        for &key in keys {
            self.fetch(key);
        }
    }

    /// Read-only column access; errors if the column was never materialized.
    pub fn column(&self, key: IndicatorKey) -> Result<&[f64], CoreError> {
        self.columns
            .get(&key)
            .map(Vec::as_slice)
            .ok_or(CoreError::IndicatorNotMaterialized(key))
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&[f64]> {
        self.columns.get(&key).map(Vec::as_slice)
    }

    /// Number of materialized columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::indicators::IndicatorKind;
    use chrono::{Duration, TimeZone, Utc};

    fn make_series(closes: &[f64]) -> PriceSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn fetch_computes_and_memoizes() {
        let series = make_series(&[100.0, 102.0, 104.0, 101.0]);
        let mut table = IndicatorTable::new(&series);
        let key = IndicatorKey::new(IndicatorKind::Sma, 2);

        let first = table.fetch(key).to_vec();
        assert_eq!(table.num_columns(), 1);

        // Second fetch returns the stored column, no new entry.
        let second = table.fetch(key).to_vec();
        assert_eq!(table.num_columns(), 1);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[2], second[2]);
    }

    #[test]
    fn distinct_keys_are_distinct_columns() {
        let series = make_series(&[100.0, 102.0, 104.0, 101.0, 105.0]);
        let mut table = IndicatorTable::new(&series);
        table.fetch(IndicatorKey::new(IndicatorKind::Sma, 2));
        table.fetch(IndicatorKey::new(IndicatorKind::Sma, 3));
        table.fetch(IndicatorKey::new(IndicatorKind::Ema, 2));
        assert_eq!(table.num_columns(), 3);
    }

    #[test]
    fn column_errors_before_materialization() {
        let series = make_series(&[100.0, 102.0]);
        let table = IndicatorTable::new(&series);
        let key = IndicatorKey::new(IndicatorKind::Rsi, 2);
        assert_eq!(
            table.column(key).unwrap_err(),
            CoreError::IndicatorNotMaterialized(key)
        );
        assert!(table.get(key).is_none());
    }

    #[test]
    fn materialize_is_idempotent() {
        let series = make_series(&[100.0, 102.0, 104.0]);
        let mut table = IndicatorTable::new(&series);
        let keys = [
            IndicatorKey::new(IndicatorKind::Sma, 2),
            IndicatorKey::new(IndicatorKind::Sma, 2),
            IndicatorKey::new(IndicatorKind::Ema, 2),
        ];
        table.materialize(&keys);
        table.materialize(&keys);
        assert_eq!(table.num_columns(), 2);
    }

    #[test]
    fn empty_series_yields_empty_columns() {
        let series = PriceSeries::empty();
        let mut table = IndicatorTable::new(&series);
        let col = table.fetch(IndicatorKey::new(IndicatorKind::Sma, 3));
        assert!(col.is_empty());
    }
}
