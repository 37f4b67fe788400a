//! Simple Moving Average (SMA).
//!
//! Rolling mean of the `window` closes strictly before each bar (lag-1, no
//! lookahead). First valid value at index `window`; a series of length `n`
//! has exactly `n - window` finite entries.

/// Compute the lag-1 SMA column.
pub fn sma(closes: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "SMA window must be >= 1");
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if n <= window {
        return out;
    }

    let mut sum: f64 = closes[..window].iter().sum();
    out[window] = sum / window as f64;

    // Roll the window forward: at bar i the window is closes[i-window..i].
    for i in window + 1..n {
        sum += closes[i - 1] - closes[i - 1 - window];
        out[i] = sum / window as f64;
    }

    out
}
