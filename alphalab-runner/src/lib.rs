//! AlphaLab Runner — optimization harness around the core engine.
//!
//! - Run records and the trial ledger (what one evaluation produced)
//! - Random parameter-space search on a rayon worker pool
//! - Run comparison: input/output distance, sensitivity, stability
//! - CSV persistence of records and equity curves
//! - The market-data collaborator boundary (CSV ingest)

pub mod compare;
pub mod config;
pub mod data;
pub mod ledger;
pub mod optimizer;
pub mod record;
pub mod rng;
pub mod store;

pub use compare::{compare_runs, stability_estimate, CompareError, Sensitivity};
pub use config::OptimizeConfig;
pub use data::{CsvProvider, MarketDataProvider};
pub use ledger::TrialLedger;
pub use optimizer::{Optimizer, OptimizerError, StdoutProgress, TrialProgress};
pub use record::{DatasetId, RunRecord};
