//! Bollinger band breakout.
//!
//! Bands sit `factor` rolling standard deviations around the moving average.
//! Buys when the close breaks above the upper band by more than the margin,
//! sells when it breaks below the lower band. The band width uses the
//! current-bar-inclusive rolling std while the centre is the lag-1 average;
//! the mixed lags are intentional and match the reference results.

use crate::error::CoreError;
use crate::indicators::{rolling_std, IndicatorKey, IndicatorKind};
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
            name: "factor",
            label: "Factor",
            kind: ParamKind::Scalar { default: 0.5 },
            metric: DistanceMetric::Exponential,
            step: 0.1,
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
    factor: f64,
    margin: f64,
) -> Result<Vec<Signal>, CoreError> {
    let (kind, window) = indicator;
    let closes = table.closes();
    let avg = table.column(IndicatorKey::new(kind, window))?;
    let std = rolling_std(closes, window);
    let mut signals = vec![Signal::Hold; closes.len()];

    for i in window..closes.len() {
        let upper = avg[i] + factor * std[i];
        let lower = avg[i] - factor * std[i];
        if closes[i] > upper * (1.0 + margin) {
            signals[i] = Signal::Buy;
        } else if closes[i] < lower * (1.0 - margin) {
            signals[i] = Signal::Sell;
        }
    }

    Ok(signals)
}
