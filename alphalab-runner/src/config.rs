//! TOML configuration for optimization batches.
//!
//! Lets the CLI describe a whole batch in one file:
//!
//! ```toml
//! symbol = "BTC-USD"
//! period = "365d"
//! interval = "1d"
//! strategy = "SimpleMeanReversion"
//! trials = 200
//! seed = 42
//! cost_per_trade = 0.5
//!
//! [ranges.indicator]
//! min = 5
//! max = 50
//!
//! [ranges.margin]
//! min = 0.0
//! max = 0.1
//! ```
//!
//! Range entries are plain min/max numbers; their shape (integer window vs.
//! float value) is resolved against the strategy's schema when the config
//! is turned into an [`Optimizer`] range map.

use crate::optimizer::{ParamRange, RangeMap};
use alphalab_core::strategy::{ParamKind, StrategyKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
    #[error("range for unknown parameter '{0}'")]
    UnknownParameter(String),
}

fn default_period() -> String {
    "365d".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_cost_per_trade() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
}

/// One optimization batch, as written by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeConfig {
    pub symbol: String,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    pub strategy: String,
    pub trials: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_cost_per_trade")]
    pub cost_per_trade: f64,
    #[serde(default)]
    pub ranges: BTreeMap<String, RangeSpec>,
}

impl OptimizeConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        self.strategy
            .parse()
            .map_err(|_| ConfigError::UnknownStrategy(self.strategy.clone()))
    }

    /// Resolve the raw min/max numbers into typed ranges using the
    /// strategy's schema. A range naming a parameter the schema lacks is an
    /// error; bounds themselves are validated later by the optimizer.
    pub fn range_map(&self) -> Result<RangeMap, ConfigError> {
        let schema = self.strategy_kind()?.schema();
        let mut map = RangeMap::new();

        for (name, spec) in &self.ranges {
            let param = schema
                .get(name)
                .ok_or_else(|| ConfigError::UnknownParameter(name.clone()))?;
            let range = match param.kind {
                ParamKind::Indicator { .. } => {
                    ParamRange::Window(spec.min as usize, spec.max as usize)
                }
                ParamKind::Scalar { .. } => ParamRange::Value(spec.min, spec.max),
            };
            map.insert(name.clone(), range);
        }

        Ok(map)
    }
}
