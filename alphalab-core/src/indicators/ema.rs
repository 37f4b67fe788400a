//! Exponential Moving Average (EMA).
//!
//! Seeded at index `window - 1` with the simple mean of the first `window`
//! closes, then the recurrence `ema[i] = k*close[i] + (1-k)*ema[i-1]` with
//! `k = 2/(window+1)`. A strictly sequential scan; a series of length `n`
//! has exactly `n - window + 1` finite entries.

/// Compute the EMA column.
pub fn ema(closes: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "EMA window must be >= 1");
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if n < window {
        return out;
    }

    let k = 2.0 / (window as f64 + 1.0);
    out[window - 1] = closes[..window].iter().sum::<f64>() / window as f64;

    for i in window..n {
        out[i] = k * closes[i] + (1.0 - k) * out[i - 1];
    }

    out
}
