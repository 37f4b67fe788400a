//! Engine error types.
//!
//! Errors are raised synchronously at the point of violation. The engine
//! never substitutes defaults except the documented fallbacks (empty series
//! flow through as empty outputs, zero variance yields Sharpe 0, zero trades
//! yield zeroed trade metrics).

use crate::indicators::IndicatorKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Backtest requested before any signals were generated.
    #[error("no signals have been generated yet")]
    SignalsNotReady,

    /// Statistics requested before an equity curve exists.
    #[error("no equity curve: run the backtest first")]
    BacktestNotReady,

    /// A strategy was instantiated without a required parameter.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A parameter was supplied with the wrong value shape.
    #[error("parameter '{name}' expects {expected}")]
    ParameterType {
        name: &'static str,
        expected: &'static str,
    },

    /// Reference to a strategy name that is not registered.
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    /// Reference to an indicator kind that is not registered.
    #[error("unknown indicator kind '{0}'")]
    UnknownIndicatorKind(String),

    /// A rule set referenced an indicator column that was never computed
    /// into the table it was given.
    #[error("indicator {0} has not been materialized")]
    IndicatorNotMaterialized(IndicatorKey),

    /// Bar timestamps must be strictly increasing.
    #[error("bar timestamps must be strictly increasing")]
    UnorderedTimestamps,
}
