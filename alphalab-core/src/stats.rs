//! Performance statistics extracted from an equity curve.
//!
//! Trade segmentation first: a flat period is any adjacent pair whose
//! absolute difference is below [`FLATNESS_EPS`]; a trade spans from the
//! equity value immediately preceding the first non-flat move to the value
//! where flatness resumes (or the final value if the curve ends mid-trade).
//! The aggregate metrics then reduce the trade list and the curve's first
//! differences.
//!
//! Rounding reproduces the reference pipeline exactly: trade-level values
//! are rounded to 2 decimals as fractions first, then again as percentages.
//! `biggest_win_pct` for a 3.44% trade is therefore 3.0, not 3.44.

use serde::{Deserialize, Serialize};

/// Below this, two adjacent equity values count as a flat period.
pub const FLATNESS_EPS: f64 = 1e-12;

/// Round to 2 decimal places.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Extract completed trade returns from an equity curve.
///
/// Each element is `equity_end / equity_start - 1` for one trade. A curve
/// that ends while still in a trade closes it at the final value. Empty and
/// constant curves yield no trades.
pub fn trade_returns(equity: &[f64]) -> Vec<f64> {
    if equity.is_empty() {
        return Vec::new();
    }

    let mut trades = Vec::new();
    let mut in_trade = false;
    let mut start = equity[0];

    for i in 1..equity.len() {
        if (equity[i] - equity[i - 1]).abs() < FLATNESS_EPS {
            if in_trade {
                trades.push(equity[i] / start - 1.0);
                in_trade = false;
            }
        } else if !in_trade {
            start = equity[i - 1];
            in_trade = true;
        }
    }

    if in_trade {
        trades.push(equity[equity.len() - 1] / start - 1.0);
    }

    trades
}

/// Sharpe ratio over the curve's first differences: `sqrt(n) * (mean - rf)
/// / std`, population standard deviation, no calendar annualization.
/// Returns 0.0 when the variance is zero or the curve has fewer than 2
/// entries.
pub fn sharpe_ratio(equity: &[f64], risk_free_return: f64) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity.windows(2).map(|w| w[1] - w[0]).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std == 0.0 {
        return 0.0;
    }
    n.sqrt() * (mean - risk_free_return) / std
}

/// Aggregate statistics for one equity curve. All percentages are rounded
/// to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub profit_pct: f64,
    pub biggest_win_pct: f64,
    pub biggest_loss_pct: f64,
    pub avg_trade_pct: f64,
    pub num_trades: usize,
    pub win_rate_pct: f64,
    pub sharpe: f64,
}

impl Stats {
    /// Compute all metrics. An empty curve yields the zeroed record.
    pub fn compute(equity: &[f64]) -> Self {
        let trades = trade_returns(equity);

        let (biggest_loss, biggest_win) = if trades.is_empty() {
            (0.0, 0.0)
        } else {
            let min = trades.iter().copied().fold(f64::INFINITY, f64::min);
            let max = trades.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (round2(min), round2(max))
        };

        let avg_size = if trades.is_empty() {
            0.0
        } else {
            round2(trades.iter().map(|t| t.abs()).sum::<f64>() / trades.len() as f64)
        };

        let win_rate = if trades.is_empty() {
            0.0
        } else {
            let wins = trades.iter().filter(|t| **t > 0.0).count();
            round2(wins as f64 / trades.len() as f64)
        };

        let profit = match equity.last() {
            Some(last) => round2((last - 1.0) * 100.0),
            None => 0.0,
        };

        Stats {
            profit_pct: profit,
            biggest_win_pct: round2(biggest_win * 100.0),
            biggest_loss_pct: round2(biggest_loss * 100.0),
            avg_trade_pct: round2(avg_size * 100.0),
            num_trades: trades.len(),
            win_rate_pct: round2(win_rate * 100.0),
            sharpe: round2(sharpe_ratio(equity, 0.0)),
        }
    }

    pub fn zeroed() -> Self {
        Self::compute(&[])
    }
}
