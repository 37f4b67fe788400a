//! AlphaLab Core — strategy evaluation engine.
//!
//! This crate contains the computational heart of the backtester:
//! - Domain types (bars, price series, signals)
//! - Indicator library (SMA, EMA, RSI) with memoized columns
//! - Strategy contract and the four concrete rule sets
//! - Position-simulation state machine (Flat/Long with fee accounting)
//! - Statistics extractor (trade segmentation + performance metrics)
//!
//! Everything here is pure computation over explicit inputs: a price series
//! and a parameter set go in, signals, an equity curve, and statistics come
//! out. Data retrieval, persistence, and display live in collaborator crates.

pub mod backtest;
pub mod domain;
pub mod error;
pub mod eval;
pub mod indicators;
pub mod stats;
pub mod strategy;
pub mod table;

pub use error::CoreError;
