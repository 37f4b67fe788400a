//! RSI threshold rule set.
//!
//! Buys when RSI drops below `margin*100`, sells when it rises above
//! `100 - margin*100`. Evaluated from the indicator window onward.

use crate::error::CoreError;
use crate::indicators::{IndicatorKey, IndicatorKind};
use crate::strategy::schema::{DistanceMetric, ParamKind, ParamSchema, ParamSpec};
use crate::strategy::Signal;
use crate::table::IndicatorTable;

pub static SCHEMA: ParamSchema = ParamSchema {
    params: &[
        ParamSpec {
            name: "indicator",
            label: "Indicator",
            kind: ParamKind::Indicator {
                allowed: &[IndicatorKind::Rsi],
                default: (IndicatorKind::Rsi, 14),
            },
            metric: DistanceMetric::Discrete,
            step: 1.0,
        },
        ParamSpec {
            name: "margin",
            label: "Margin",
            kind: ParamKind::Scalar { default: 0.25 },
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
    indicator: (IndicatorKind, usize),
    margin: f64,
) -> Result<Vec<Signal>, CoreError> {
    let (kind, window) = indicator;
    let rsi = table.column(IndicatorKey::new(kind, window))?;
    let threshold = margin * 100.0;
    let mut signals = vec![Signal::Hold; table.len()];

    for i in window..table.len() {
        if rsi[i] < threshold {
            signals[i] = Signal::Buy;
        } else if rsi[i] > 100.0 - threshold {
            signals[i] = Signal::Sell;
        }
    }

    Ok(signals)
}
