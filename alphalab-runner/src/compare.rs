//! Run comparison — distance metrics between stored run records.
//!
//! Operates purely on [`RunRecord`]s plus the strategy's declared schema.
//! The input distance measures how far apart two runs' parameters sit
//! (excluding `cost_per_trade`); the output distance measures how far apart
//! their profits landed; their ratio is an empirical local sensitivity.
//! Sweeping the ratio against every stored run gives a worst-case
//! (Lipschitz-like) stability estimate for one reference run.

use crate::record::RunRecord;
use alphalab_core::strategy::{DistanceMetric, StrategyKind};
use thiserror::Error;

/// Input distances below this count as "identical parameters".
pub const ZERO_DISTANCE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// The records differ in asset, period, interval, or strategy class.
    #[error("runs are incomparable: different asset, period, interval, or strategy")]
    IncomparableRuns,

    /// A record lacks a parameter its schema declares.
    #[error("record is missing parameter '{0}'")]
    MissingParameter(String),

    /// A record carries a parameter whose shape disagrees with the schema.
    #[error("parameter '{0}' does not fit its schema entry")]
    ParameterShape(String),

    /// The records reference a strategy name that is not registered.
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}

/// Distance pair plus sensitivity ratio for two comparable runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub input_distance: f64,
    pub output_distance: f64,
    pub ratio: f64,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Parameter-space distance between two runs, normalized by the number of
/// compared parameters. Symmetric, and zero for identical parameters.
pub fn input_distance(a: &RunRecord, b: &RunRecord) -> Result<f64, CompareError> {
    if a.asset != b.asset
        || a.period != b.period
        || a.interval != b.interval
        || a.strategy != b.strategy
    {
        return Err(CompareError::IncomparableRuns);
    }

    let kind = a
        .strategy
        .parse::<StrategyKind>()
        .map_err(|_| CompareError::UnknownStrategy(a.strategy.clone()))?;

    let mut distance = 0.0;
    let mut compared = 0usize;

    for spec in kind.schema().compared() {
        let va = a
            .param(spec.name)
            .ok_or_else(|| CompareError::MissingParameter(spec.name.to_string()))?;
        let vb = b
            .param(spec.name)
            .ok_or_else(|| CompareError::MissingParameter(spec.name.to_string()))?;
        compared += 1;

        distance += match spec.metric {
            DistanceMetric::Discrete => {
                let (kind_a, window_a) = va
                    .as_indicator()
                    .ok_or_else(|| CompareError::ParameterShape(spec.name.to_string()))?;
                let (kind_b, window_b) = vb
                    .as_indicator()
                    .ok_or_else(|| CompareError::ParameterShape(spec.name.to_string()))?;

                let kind_term = if kind_a != kind_b { 0.5 } else { 0.0 };
                let delta = (window_a as f64 - window_b as f64).abs();
                kind_term + round2(((-delta).exp() - 1.0).abs()) / 2.0
            }
            DistanceMetric::Exponential => {
                let sa = va
                    .as_scalar()
                    .ok_or_else(|| CompareError::ParameterShape(spec.name.to_string()))?;
                let sb = vb
                    .as_scalar()
                    .ok_or_else(|| CompareError::ParameterShape(spec.name.to_string()))?;
                round2(((-(sa - sb).abs()).exp() - 1.0).abs())
            }
            DistanceMetric::None => 0.0,
        };
    }

    Ok(distance / compared.max(1) as f64)
}

/// Profit-space distance between two runs.
pub fn output_distance(a: &RunRecord, b: &RunRecord) -> f64 {
    round3((a.stats.profit_pct - b.stats.profit_pct).abs() / 100.0)
}

/// Output distance over input distance, 0.000 when the inputs are
/// (numerically) identical.
pub fn sensitivity_ratio(input: f64, output: f64) -> f64 {
    if input < ZERO_DISTANCE_EPS {
        0.0
    } else {
        round3(output / input)
    }
}

/// Full comparison of two runs.
pub fn compare_runs(a: &RunRecord, b: &RunRecord) -> Result<Sensitivity, CompareError> {
    let input = input_distance(a, b)?;
    let output = output_distance(a, b);
    Ok(Sensitivity {
        input_distance: input,
        output_distance: output,
        ratio: sensitivity_ratio(input, output),
    })
}

/// Worst-case sensitivity of `reference` against every stored run,
/// including itself: an empirical local Lipschitz-constant estimate for the
/// strategy's profit response to parameter perturbation.
///
/// Incomparable pairs contribute 0.0 rather than aborting the sweep, so a
/// mixed collection still yields an estimate.
pub fn stability_estimate(reference: &RunRecord, records: &[RunRecord]) -> f64 {
    records
        .iter()
        .map(|record| match compare_runs(reference, record) {
            Ok(sensitivity) => sensitivity.ratio,
            Err(_) => 0.0,
        })
        .fold(0.0, f64::max)
}
