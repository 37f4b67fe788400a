//! Indicator library.
//!
//! Three indicator kinds (SMA, EMA, RSI), each a pure function from a close
//! column to a numeric series of the same length. Warmup entries are
//! `f64::NAN`; rule sets treat NaN comparisons as "no signal", so the warmup
//! prefix never trades.
//!
//! Columns are computed once per `(kind, window)` key and memoized in an
//! [`crate::table::IndicatorTable`]; see that module for the idempotent
//! insert contract.

pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::ema;
pub use rsi::rsi;
pub use sma::sma;

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of indicator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 3] = [IndicatorKind::Sma, IndicatorKind::Ema, IndicatorKind::Rsi];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SMA" => Ok(IndicatorKind::Sma),
            "EMA" => Ok(IndicatorKind::Ema),
            "RSI" => Ok(IndicatorKind::Rsi),
            other => Err(CoreError::UnknownIndicatorKind(other.to_string())),
        }
    }
}

/// Key of one indicator column: kind plus lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorKey {
    pub kind: IndicatorKind,
    pub window: usize,
}

impl IndicatorKey {
    pub fn new(kind: IndicatorKind, window: usize) -> Self {
        Self { kind, window }
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.window)
    }
}

/// Compute one indicator column over a close column.
pub fn compute(key: IndicatorKey, closes: &[f64]) -> Vec<f64> {
    match key.kind {
        IndicatorKind::Sma => sma(closes, key.window),
        IndicatorKind::Ema => ema(closes, key.window),
        IndicatorKind::Rsi => rsi(closes, key.window),
    }
}

/// Trailing sample standard deviation (ddof = 1) over `window` closes,
/// current bar inclusive. First valid value at index `window - 1`.
///
/// Used by the Bollinger rule set for its band width; not memoized as a
/// table column because it is keyed to the rule set's own window.
pub fn rolling_std(closes: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling_std window must be >= 1");
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if n < window || window < 2 {
        // A one-sample window has zero degrees of freedom.
        return out;
    }
    for i in (window - 1)..n {
        let slice = &closes[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var =
            slice.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = var.sqrt();
    }
    out
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
