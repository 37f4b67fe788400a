//! Random parameter-space search.
//!
//! Given a strategy kind, a per-parameter range map, and a trial count, the
//! optimizer pre-materializes every indicator column reachable from the
//! ranges, then evaluates N random parameter draws against the shared
//! read-only table on a rayon worker pool. Results land in a
//! [`TrialLedger`] in trial order, so output is independent of scheduling.
//!
//! Draws are deterministic under the master seed: each trial's RNG is
//! derived by hashing (seed, strategy, trial index), never by sharing a
//! sequential stream across threads.

use crate::ledger::TrialLedger;
use crate::record::{DatasetId, RunRecord};
use crate::rng;
use alphalab_core::backtest::simulate;
use alphalab_core::domain::PriceSeries;
use alphalab_core::error::CoreError;
use alphalab_core::indicators::{IndicatorKey, IndicatorKind};
use alphalab_core::stats::Stats;
use alphalab_core::strategy::{
    ParamKind, ParamSet, ParamValue, Strategy, StrategyKind, COST_PER_TRADE,
};
use alphalab_core::table::IndicatorTable;
use rand::Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

/// Caller-supplied sampling range for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// Integer window range for indicator parameters, inclusive.
    Window(usize, usize),
    /// Float range for scalar parameters, inclusive.
    Value(f64, f64),
}

/// Parameter name → sampling range. Ordered for reproducible reporting.
pub type RangeMap = BTreeMap<String, ParamRange>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("invalid range for '{name}': min {min} > max {max}")]
    InvalidParameterRange { name: String, min: f64, max: f64 },

    #[error("no range configured for parameter '{0}'")]
    MissingRange(String),

    #[error("range for '{name}' does not fit the parameter: expected {expected}")]
    RangeShape {
        name: String,
        expected: &'static str,
    },

    #[error("window range for '{name}' must start at 1 or above")]
    WindowTooSmall { name: String },

    #[error("trial {index} failed: {source}")]
    Trial {
        index: usize,
        #[source]
        source: CoreError,
    },
}

/// Observer for per-trial progress. Purely observational: implementations
/// must not influence results.
pub trait TrialProgress: Sync {
    fn on_trial_complete(&self, index: usize, total: usize, record: &RunRecord);
}

/// Prints one line per completed trial.
pub struct StdoutProgress;

impl TrialProgress for StdoutProgress {
    fn on_trial_complete(&self, index: usize, total: usize, record: &RunRecord) {
        let percentage = ((index + 1) as f64 / total as f64) * 100.0;
        println!(
            "backtesting progress: {percentage:.2}% ({}/{total}), profit {:.2}%",
            index + 1,
            record.stats.profit_pct
        );
    }
}

/// Discards progress events.
pub struct SilentProgress;

impl TrialProgress for SilentProgress {
    fn on_trial_complete(&self, _index: usize, _total: usize, _record: &RunRecord) {}
}

/// One validated sampling instruction, resolved from schema plus ranges.
#[derive(Debug, Clone)]
enum DrawSpec {
    Indicator {
        name: &'static str,
        allowed: &'static [IndicatorKind],
        lo: usize,
        hi: usize,
    },
    Scalar {
        name: &'static str,
        lo: f64,
        hi: f64,
    },
}

/// Random search over one strategy's parameter space.
#[derive(Debug)]
pub struct Optimizer {
    kind: StrategyKind,
    plan: Vec<DrawSpec>,
    trials: usize,
    cost_per_trade: f64,
    master_seed: u64,
}

impl Optimizer {
    /// Build an optimizer, validating the whole range map up front: every
    /// sampled parameter needs a range of the right shape with min <= max
    /// (and windows starting at 1). Any violation rejects the configuration
    /// before any work happens.
    pub fn new(
        kind: StrategyKind,
        ranges: &RangeMap,
        trials: usize,
    ) -> Result<Self, OptimizerError> {
        let mut plan = Vec::new();

        for spec in kind.schema().compared() {
            let range = ranges
                .get(spec.name)
                .ok_or_else(|| OptimizerError::MissingRange(spec.name.to_string()))?;

            match (spec.kind, *range) {
                (ParamKind::Indicator { allowed, .. }, ParamRange::Window(lo, hi)) => {
                    if lo > hi {
                        return Err(OptimizerError::InvalidParameterRange {
                            name: spec.name.to_string(),
                            min: lo as f64,
                            max: hi as f64,
                        });
                    }
                    if lo < 1 {
                        return Err(OptimizerError::WindowTooSmall {
                            name: spec.name.to_string(),
                        });
                    }
                    plan.push(DrawSpec::Indicator {
                        name: spec.name,
                        allowed,
                        lo,
                        hi,
                    });
                }
                (ParamKind::Scalar { .. }, ParamRange::Value(lo, hi)) => {
                    if lo > hi {
                        return Err(OptimizerError::InvalidParameterRange {
                            name: spec.name.to_string(),
                            min: lo,
                            max: hi,
                        });
                    }
                    plan.push(DrawSpec::Scalar {
                        name: spec.name,
                        lo,
                        hi,
                    });
                }
                (ParamKind::Indicator { .. }, ParamRange::Value(..)) => {
                    return Err(OptimizerError::RangeShape {
                        name: spec.name.to_string(),
                        expected: "an integer window range",
                    });
                }
                (ParamKind::Scalar { .. }, ParamRange::Window(..)) => {
                    return Err(OptimizerError::RangeShape {
                        name: spec.name.to_string(),
                        expected: "a float value range",
                    });
                }
            }
        }

        Ok(Self {
            kind,
            plan,
            trials,
            cost_per_trade: 0.5,
            master_seed: 0,
        })
    }

    /// Fix the fee applied to every trial. Never sampled.
    pub fn with_cost_per_trade(mut self, fee_pct: f64) -> Self {
        self.cost_per_trade = fee_pct;
        self
    }

    pub fn with_seed(mut self, master_seed: u64) -> Self {
        self.master_seed = master_seed;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Every indicator column a draw could reference.
    fn reachable_keys(&self) -> Vec<IndicatorKey> {
        let mut keys = Vec::new();
        for spec in &self.plan {
            if let DrawSpec::Indicator {
                allowed, lo, hi, ..
            } = spec
            {
                for &kind in *allowed {
                    for window in *lo..=*hi {
                        keys.push(IndicatorKey::new(kind, window));
                    }
                }
            }
        }
        keys
    }

    /// Draw the parameter combination for one trial.
    fn draw(&self, trial: usize) -> ParamSet {
        let mut rng = rng::trial_rng(self.master_seed, self.kind, trial as u64);
        let mut params = ParamSet::new();

        for spec in &self.plan {
            match *spec {
                DrawSpec::Indicator {
                    name,
                    allowed,
                    lo,
                    hi,
                } => {
                    let kind = allowed[rng.gen_range(0..allowed.len())];
                    let window = rng.gen_range(lo..=hi);
                    params.insert(name, ParamValue::Indicator(kind, window));
                }
                DrawSpec::Scalar { name, lo, hi } => {
                    let value: f64 = rng.gen_range(lo..=hi);
                    params.insert(name, ParamValue::Scalar(round2(value)));
                }
            }
        }

        params.insert(COST_PER_TRADE, ParamValue::Scalar(self.cost_per_trade));
        params
    }

    /// Run the batch silently.
    pub fn run(
        &self,
        series: &PriceSeries,
        dataset: &DatasetId,
    ) -> Result<TrialLedger, OptimizerError> {
        self.run_with_progress(series, dataset, &SilentProgress)
    }

    /// Run the batch, reporting each completed trial to `progress`.
    ///
    /// Pre-materializes all reachable indicator columns, then evaluates
    /// trials in parallel against the frozen table. The first failing trial
    /// aborts the whole batch and its index is reported in the error.
    pub fn run_with_progress(
        &self,
        series: &PriceSeries,
        dataset: &DatasetId,
        progress: &dyn TrialProgress,
    ) -> Result<TrialLedger, OptimizerError> {
        let mut table = IndicatorTable::new(series);
        table.materialize(&self.reachable_keys());
        let table = &table; // read-only from here on

        let total = self.trials;
        let results: Vec<(RunRecord, Vec<f64>)> = (0..total)
            .into_par_iter()
            .map(|index| {
                let params = self.draw(index);
                let out = run_trial(self.kind, &params, table, dataset)
                    .map_err(|source| OptimizerError::Trial { index, source })?;
                progress.on_trial_complete(index, total, &out.0);
                Ok(out)
            })
            .collect::<Result<Vec<_>, OptimizerError>>()?;

        let mut ledger = TrialLedger::new(self.kind, dataset.clone());
        for (record, equity) in results {
            ledger.push(record, equity);
        }
        Ok(ledger)
    }
}

/// One trial: instantiate, signal, simulate, summarize.
fn run_trial(
    kind: StrategyKind,
    params: &ParamSet,
    table: &IndicatorTable,
    dataset: &DatasetId,
) -> Result<(RunRecord, Vec<f64>), CoreError> {
    let strategy = Strategy::new(kind, params)?;
    let signals = strategy.generate_signals(table)?;
    let fee = params.scalar(COST_PER_TRADE).unwrap_or(0.5);
    let equity = simulate(table.closes(), &signals, fee);
    let stats = Stats::compute(&equity);
    Ok((RunRecord::new(dataset, kind, params, stats), equity))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
