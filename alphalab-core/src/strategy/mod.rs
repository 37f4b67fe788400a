//! Strategy contract and the four concrete rule sets.
//!
//! A strategy is a closed set of variants behind one capability:
//! `generate_signals(table) -> Vec<Signal>`. Selection is by tagged enum —
//! [`StrategyKind`] names the rule set and carries its [`ParamSchema`];
//! [`Strategy`] is an instantiated variant with typed parameters. There is
//! no trait-object dispatch because the set is closed by design.

pub mod bollinger;
pub mod mean_reversion;
pub mod momentum;
pub mod rsi_threshold;
pub mod schema;

pub use schema::{
    DistanceMetric, ParamKind, ParamSchema, ParamSet, ParamSpec, ParamValue, COST_PER_TRADE,
};

use crate::error::CoreError;
use crate::indicators::{IndicatorKey, IndicatorKind};
use crate::table::IndicatorTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-bar trading instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }
}

/// The closed set of rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    MeanReversion,
    Momentum,
    RsiThreshold,
    Bollinger,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::MeanReversion,
        StrategyKind::Momentum,
        StrategyKind::RsiThreshold,
        StrategyKind::Bollinger,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "SimpleMeanReversion",
            StrategyKind::Momentum => "BasicMomentum",
            StrategyKind::RsiThreshold => "BasicRSI",
            StrategyKind::Bollinger => "Bollinger",
        }
    }

    pub fn schema(&self) -> &'static ParamSchema {
        match self {
            StrategyKind::MeanReversion => &mean_reversion::SCHEMA,
            StrategyKind::Momentum => &momentum::SCHEMA,
            StrategyKind::RsiThreshold => &rsi_threshold::SCHEMA,
            StrategyKind::Bollinger => &bollinger::SCHEMA,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CoreError::UnknownStrategy(s.to_string()))
    }
}

/// An instantiated rule set with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    MeanReversion {
        indicator: (IndicatorKind, usize),
        margin: f64,
    },
    Momentum {
        short: (IndicatorKind, usize),
        long: (IndicatorKind, usize),
        margin: f64,
    },
    RsiThreshold {
        indicator: (IndicatorKind, usize),
        margin: f64,
    },
    Bollinger {
        indicator: (IndicatorKind, usize),
        factor: f64,
        margin: f64,
    },
}

fn require_indicator(
    params: &ParamSet,
    name: &'static str,
) -> Result<(IndicatorKind, usize), CoreError> {
    match params.get(name) {
        Some(value) => value.as_indicator().ok_or(CoreError::ParameterType {
            name,
            expected: "an indicator (kind, window) value",
        }),
        None => Err(CoreError::MissingParameter(name)),
    }
}

fn require_scalar(params: &ParamSet, name: &'static str) -> Result<f64, CoreError> {
    match params.get(name) {
        Some(value) => value.as_scalar().ok_or(CoreError::ParameterType {
            name,
            expected: "a scalar value",
        }),
        None => Err(CoreError::MissingParameter(name)),
    }
}

impl Strategy {
    /// Instantiate a rule set from a drawn or user-supplied parameter set.
    /// An absent or wrong-shaped required parameter is the explicit
    /// "not ready" result.
    pub fn new(kind: StrategyKind, params: &ParamSet) -> Result<Self, CoreError> {
        match kind {
            StrategyKind::MeanReversion => Ok(Strategy::MeanReversion {
                indicator: require_indicator(params, "indicator")?,
                margin: require_scalar(params, "margin")?,
            }),
            StrategyKind::Momentum => Ok(Strategy::Momentum {
                short: require_indicator(params, "short_ma")?,
                long: require_indicator(params, "long_ma")?,
                margin: require_scalar(params, "margin")?,
            }),
            StrategyKind::RsiThreshold => Ok(Strategy::RsiThreshold {
                indicator: require_indicator(params, "indicator")?,
                margin: require_scalar(params, "margin")?,
            }),
            StrategyKind::Bollinger => Ok(Strategy::Bollinger {
                indicator: require_indicator(params, "indicator")?,
                factor: require_scalar(params, "factor")?,
                margin: require_scalar(params, "margin")?,
            }),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::MeanReversion { .. } => StrategyKind::MeanReversion,
            Strategy::Momentum { .. } => StrategyKind::Momentum,
            Strategy::RsiThreshold { .. } => StrategyKind::RsiThreshold,
            Strategy::Bollinger { .. } => StrategyKind::Bollinger,
        }
    }

    /// Indicator columns this instance reads from the table.
    pub fn required_keys(&self) -> Vec<IndicatorKey> {
        match self {
            Strategy::MeanReversion {
                indicator: (kind, window),
                ..
            }
            | Strategy::RsiThreshold {
                indicator: (kind, window),
                ..
            }
            | Strategy::Bollinger {
                indicator: (kind, window),
                ..
            } => vec![IndicatorKey::new(*kind, *window)],
            Strategy::Momentum { short, long, .. } => vec![
                IndicatorKey::new(short.0, short.1),
                IndicatorKey::new(long.0, long.1),
            ],
        }
    }

    /// The instance's parameters in schema order, for record stamping.
    pub fn params(&self) -> ParamSet {
        let mut set = ParamSet::new();
        match *self {
            Strategy::MeanReversion {
                indicator: (kind, window),
                margin,
            } => {
                set.insert("indicator", ParamValue::Indicator(kind, window));
                set.insert("margin", ParamValue::Scalar(margin));
            }
            Strategy::Momentum { short, long, margin } => {
                set.insert("short_ma", ParamValue::Indicator(short.0, short.1));
                set.insert("long_ma", ParamValue::Indicator(long.0, long.1));
                set.insert("margin", ParamValue::Scalar(margin));
            }
            Strategy::RsiThreshold {
                indicator: (kind, window),
                margin,
            } => {
                set.insert("indicator", ParamValue::Indicator(kind, window));
                set.insert("margin", ParamValue::Scalar(margin));
            }
            Strategy::Bollinger {
                indicator: (kind, window),
                factor,
                margin,
            } => {
                set.insert("indicator", ParamValue::Indicator(kind, window));
                set.insert("factor", ParamValue::Scalar(factor));
                set.insert("margin", ParamValue::Scalar(margin));
            }
        }
        set
    }

    /// Produce one signal per bar. Bars before the rule set's valid window
    /// hold, as does any bar where an indicator value is NaN.
    pub fn generate_signals(&self, table: &IndicatorTable) -> Result<Vec<Signal>, CoreError> {
        match *self {
            Strategy::MeanReversion { indicator, margin } => {
                mean_reversion::generate(table, indicator, margin)
            }
            Strategy::Momentum { short, long, margin } => {
                momentum::generate(table, short, long, margin)
            }
            Strategy::RsiThreshold { indicator, margin } => {
                rsi_threshold::generate(table, indicator, margin)
            }
            Strategy::Bollinger {
                indicator,
                factor,
                margin,
            } => bollinger::generate(table, indicator, factor, margin),
        }
    }
}
