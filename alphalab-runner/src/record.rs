//! Run records — the persisted summary of one strategy evaluation.

use alphalab_core::stats::Stats;
use alphalab_core::strategy::{ParamSet, ParamValue, StrategyKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the dataset a run was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetId {
    pub symbol: String,
    pub period: String,
    pub interval: String,
}

impl DatasetId {
    pub fn new(
        symbol: impl Into<String>,
        period: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            period: period.into(),
            interval: interval.into(),
        }
    }
}

/// Flat, display-safe summary of one evaluation: dataset identity, strategy
/// name, statistics, typed parameters, and a creation timestamp. Immutable
/// once created; identified by its position in whatever collection holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub asset: String,
    pub period: String,
    pub interval: String,
    pub strategy: String,
    pub stats: Stats,
    /// Parameters in schema order. Values stay typed here; they render to
    /// their external string form only at the storage boundary.
    pub params: Vec<(String, ParamValue)>,
    pub created_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(dataset: &DatasetId, kind: StrategyKind, params: &ParamSet, stats: Stats) -> Self {
        Self {
            asset: dataset.symbol.clone(),
            period: dataset.period.clone(),
            interval: dataset.interval.clone(),
            strategy: kind.name().to_string(),
            stats,
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            created_at: Utc::now(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The record's strategy kind, if its name is still registered.
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        self.strategy.parse().ok()
    }
}
