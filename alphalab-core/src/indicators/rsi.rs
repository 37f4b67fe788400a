//! Relative Strength Index (RSI).
//!
//! Maintains a sliding window of the last `window - 1` close-to-close
//! differences, seeded from the first `window` closes. Each step drops the
//! oldest difference, appends the newest, splits the window into gains
//! (>= 0) and losses (< 0), and computes `rs = mean(gains)/|mean(losses)|`,
//! `rsi = 100 - 100/(1+rs)`. First valid value at index `window`.
//!
//! Quirk, kept deliberately: a window with no losses forces `rs = 0` and
//! therefore RSI = 0, not the conventional 100. Downstream rule sets and
//! stored results depend on this exact output; see the pinned test below
//! before changing it.

use std::collections::VecDeque;

/// Compute the RSI column.
pub fn rsi(closes: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "RSI window must be >= 1");
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if n < window {
        return out;
    }

    let mut diffs: VecDeque<f64> = closes[..window].windows(2).map(|w| w[1] - w[0]).collect();

    for i in window..n {
        diffs.pop_front();
        diffs.push_back(closes[i] - closes[i - 1]);

        let (mut gain_sum, mut gain_n) = (0.0, 0usize);
        let (mut loss_sum, mut loss_n) = (0.0, 0usize);
        for &d in &diffs {
            if d >= 0.0 {
                gain_sum += d;
                gain_n += 1;
            } else {
                loss_sum += d;
                loss_n += 1;
            }
        }

        let avg_gain = if gain_n == 0 { 0.0 } else { gain_sum / gain_n as f64 };
        let avg_loss = if loss_n == 0 { 0.0 } else { (loss_sum / loss_n as f64).abs() };

        // No losses in the window forces rs to 0 (and RSI to 0).
        let rs = if avg_loss == 0.0 { 0.0 } else { avg_gain / avg_loss };
        out[i] = 100.0 - 100.0 / (1.0 + rs);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_3_known_values() {
        let closes = [100.0, 101.0, 103.0, 102.0, 105.0];
        let result = rsi(&closes, 3);

        for v in &result[..3] {
            assert!(v.is_nan());
        }
        // window at i=3: diffs [2, -1] → rs = 2/1 → rsi = 100 - 100/3
        assert_approx(result[3], 100.0 - 100.0 / 3.0, DEFAULT_EPSILON);
        // window at i=4: diffs [-1, 3] → rs = 3/1 → rsi = 75
        assert_approx(result[4], 75.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_warmup_count() {
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        for window in 2..=5 {
            let finite = rsi(&closes, window).iter().filter(|v| v.is_finite()).count();
            assert_eq!(finite, closes.len() - window, "window {window}");
        }
    }

    /// Pinned quirk: an all-gain window yields RSI 0, not the conventional
    /// ~100. The zero-loss branch forces rs = 0 instead of saturating.
    #[test]
    fn rsi_all_gains_window_is_zero_not_hundred() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
        assert_approx(result[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_losses_window_is_zero() {
        // rs = 0/|mean(losses)| = 0 → rsi = 0, the conventional floor
        let closes = [104.0, 103.0, 102.0, 101.0, 100.0];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
        assert_approx(result[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_flat_diffs_count_as_gains() {
        // Zero differences land on the gain side of the split, so a flat
        // series is an all-gain window: RSI 0 via the zero-loss branch.
        let closes = [100.0; 6];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_balanced_window_is_fifty() {
        // diffs [2, -2] → rs = 2/2 = 1 → rsi = 50
        let closes = [100.0, 102.0, 100.0, 102.0];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_too_few_closes() {
        let closes = [100.0, 101.0];
        assert!(rsi(&closes, 5).iter().all(|v| v.is_nan()));
    }
}
