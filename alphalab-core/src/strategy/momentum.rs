//! Moving average crossover momentum.
//!
//! Compares a short and a long moving average: buy when the short average
//! runs above `long*(1+margin)`, sell when it falls below `long*(1-margin)`.
//! Evaluated from the long indicator's window onward.

use crate::error::CoreError;
use crate::indicators::{IndicatorKey, IndicatorKind};
use crate::strategy::schema::{DistanceMetric, ParamKind, ParamSchema, ParamSpec};
use crate::strategy::Signal;
use crate::table::IndicatorTable;

pub static SCHEMA: ParamSchema = ParamSchema {
    params: &[
        ParamSpec {
            name: "short_ma",
            label: "Short Indicator",
            kind: ParamKind::Indicator {
                allowed: &[IndicatorKind::Sma, IndicatorKind::Ema],
                default: (IndicatorKind::Sma, 10),
            },
            metric: DistanceMetric::Discrete,
            step: 1.0,
        },
        ParamSpec {
            name: "long_ma",
            label: "Long Indicator",
            kind: ParamKind::Indicator {
                allowed: &[IndicatorKind::Sma, IndicatorKind::Ema],
                default: (IndicatorKind::Sma, 50),
            },
            metric: DistanceMetric::Discrete,
            step: 1.0,
        },
        ParamSpec {
            name: "margin",
            label: "Margin",
            kind: ParamKind::Scalar { default: 0.05 },
            metric: DistanceMetric::Exponential,
            step: 0.01,
        },
        ParamSpec {
            name: "cost_per_trade",
            label: "Cost Per Trade %",
            kind: ParamKind::Scalar { default: 0.5 },
            metric: DistanceMetric::None,
            step: 0.1,
        },
    ],
};

pub(crate) fn generate(
    table: &IndicatorTable,
    short: (IndicatorKind, usize),
    long: (IndicatorKind, usize),
    margin: f64,
) -> Result<Vec<Signal>, CoreError> {
    let short_col = table.column(IndicatorKey::new(short.0, short.1))?;
    let long_col = table.column(IndicatorKey::new(long.0, long.1))?;
    let mut signals = vec![Signal::Hold; table.len()];

    for i in long.1..table.len() {
        if short_col[i] > long_col[i] * (1.0 + margin) {
            signals[i] = Signal::Buy;
        } else if short_col[i] < long_col[i] * (1.0 - margin) {
            signals[i] = Signal::Sell;
        }
    }

    Ok(signals)
}
