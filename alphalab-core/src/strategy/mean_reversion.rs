//! Simple mean reversion.
//!
//! Compares the close to a moving average and trades when the deviation
//! exceeds a margin: buy above `avg*(1+margin)`, sell below `avg*(1-margin)`.
//! Evaluated from the indicator window onward.

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
                allowed: &[IndicatorKind::Sma, IndicatorKind::Ema],
                default: (IndicatorKind::Sma, 20),
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
    indicator: (IndicatorKind, usize),
    margin: f64,
) -> Result<Vec<Signal>, CoreError> {
    let (kind, window) = indicator;
    let closes = table.closes();
    let avg = table.column(IndicatorKey::new(kind, window))?;
    let mut signals = vec![Signal::Hold; closes.len()];

    for i in window..closes.len() {
        if closes[i] > avg[i] * (1.0 + margin) {
            signals[i] = Signal::Buy;
        } else if closes[i] < avg[i] * (1.0 - margin) {
            signals[i] = Signal::Sell;
        }
    }

    Ok(signals)
}
