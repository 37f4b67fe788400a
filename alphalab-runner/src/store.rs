//! CSV persistence for run records and equity curves.
//!
//! Two files: `runs.csv` (one row per record, parameters rendered in their
//! stable external form) and `equities.csv` (one column per run, rows padded
//! with empty cells where curves differ in length). Loading re-parses
//! parameters with the total [`ParamValue`] parser; a cell that does not
//! parse fails loudly instead of smuggling a string through.

use crate::record::RunRecord;
use alphalab_core::stats::Stats;
use alphalab_core::strategy::ParamValue;
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed runs file: {0}")]
    Malformed(String),
}

const FIXED_HEADER: [&str; 11] = [
    "Asset",
    "Period",
    "Interval",
    "Strategy",
    "Profit %",
    "Biggest Win %",
    "Biggest Loss %",
    "Average Trade Size %",
    "Number of Trades",
    "Win Rate %",
    "Sharpe Ratio",
];

const TIMESTAMP_COLUMN: &str = "Timestamp";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Union of parameter names across all records, in first-seen order.
fn param_columns(records: &[RunRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in &record.params {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

/// Write all records to one CSV file. Strategies with different parameter
/// sets share the header; absent parameters are empty cells.
pub fn save_runs(path: impl AsRef<Path>, records: &[RunRecord]) -> Result<(), StoreError> {
    let params = param_columns(records);
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = FIXED_HEADER.iter().map(|s| s.to_string()).collect();
    header.extend(params.iter().cloned());
    header.push(TIMESTAMP_COLUMN.to_string());
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = vec![
            record.asset.clone(),
            record.period.clone(),
            record.interval.clone(),
            record.strategy.clone(),
            record.stats.profit_pct.to_string(),
            record.stats.biggest_win_pct.to_string(),
            record.stats.biggest_loss_pct.to_string(),
            record.stats.avg_trade_pct.to_string(),
            record.stats.num_trades.to_string(),
            record.stats.win_rate_pct.to_string(),
            record.stats.sharpe.to_string(),
        ];
        for name in &params {
            row.push(
                record
                    .param(name)
                    .map(ParamValue::to_string)
                    .unwrap_or_default(),
            );
        }
        row.push(record.created_at.format(TIMESTAMP_FORMAT).to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn parse_cell<T: std::str::FromStr>(cell: &str, column: &str) -> Result<T, StoreError> {
    cell.parse()
        .map_err(|_| StoreError::Malformed(format!("bad value '{cell}' in column '{column}'")))
}

/// Load records back from a runs CSV.
pub fn load_runs(path: impl AsRef<Path>) -> Result<Vec<RunRecord>, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (i, expected) in FIXED_HEADER.iter().enumerate() {
        if header.get(i).map(String::as_str) != Some(*expected) {
            return Err(StoreError::Malformed(format!(
                "expected column '{expected}' at position {i}"
            )));
        }
    }
    if header.last().map(String::as_str) != Some(TIMESTAMP_COLUMN) {
        return Err(StoreError::Malformed(
            "missing trailing Timestamp column".to_string(),
        ));
    }
    let param_names = &header[FIXED_HEADER.len()..header.len() - 1];

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("");

        let stats = Stats {
            profit_pct: parse_cell(cell(4), "Profit %")?,
            biggest_win_pct: parse_cell(cell(5), "Biggest Win %")?,
            biggest_loss_pct: parse_cell(cell(6), "Biggest Loss %")?,
            avg_trade_pct: parse_cell(cell(7), "Average Trade Size %")?,
            num_trades: parse_cell(cell(8), "Number of Trades")?,
            win_rate_pct: parse_cell(cell(9), "Win Rate %")?,
            sharpe: parse_cell(cell(10), "Sharpe Ratio")?,
        };

        let mut params: Vec<(String, ParamValue)> = Vec::new();
        for (offset, name) in param_names.iter().enumerate() {
            let raw = cell(FIXED_HEADER.len() + offset);
            if raw.is_empty() {
                continue;
            }
            let value: ParamValue = raw.parse().map_err(|_| {
                StoreError::Malformed(format!("bad parameter '{raw}' in column '{name}'"))
            })?;
            params.push((name.clone(), value));
        }

        let timestamp_cell = cell(header.len() - 1);
        let created_at = NaiveDateTime::parse_from_str(timestamp_cell, TIMESTAMP_FORMAT)
            .map_err(|_| StoreError::Malformed(format!("bad timestamp '{timestamp_cell}'")))?
            .and_utc();

        records.push(RunRecord {
            asset: cell(0).to_string(),
            period: cell(1).to_string(),
            interval: cell(2).to_string(),
            strategy: cell(3).to_string(),
            stats,
            params,
            created_at,
        });
    }

    Ok(records)
}

/// Write equity curves, one column per run id, rows padded with empty cells.
pub fn save_equities(path: impl AsRef<Path>, equities: &[Vec<f64>]) -> Result<(), StoreError> {
    if equities.is_empty() {
        std::fs::File::create(path)?;
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)?;

    let header: Vec<String> = (0..equities.len()).map(|i| i.to_string()).collect();
    writer.write_record(&header)?;

    let max_len = equities.iter().map(Vec::len).max().unwrap_or(0);
    for row_idx in 0..max_len {
        let row: Vec<String> = equities
            .iter()
            .map(|eq| eq.get(row_idx).map(f64::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Load equity curves back, dropping each column's padding.
pub fn load_equities(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, StoreError> {
    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let columns = reader.headers()?.len();
    let mut equities: Vec<Vec<f64>> = vec![Vec::new(); columns];

    for row in reader.records() {
        let row = row?;
        for (i, equity) in equities.iter_mut().enumerate() {
            let cell = row.get(i).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            equity.push(parse_cell(cell, "equity")?);
        }
    }

    Ok(equities)
}
