//! Position-simulation state machine.
//!
//! Two states, Flat and Long, starting Flat. Signals are shifted by one bar
//! before use: a signal observed at bar `i` takes effect on the bar-pair
//! return from `i` to `i+1` only at `i+1`'s evaluation, so no bar trades on
//! information from its own close. A multiplicative fee haircut lands on
//! each bar where a transition actually occurs, entering and exiting alike.
//!
//! The equity curve is the running product of
//! `(1 + contribution) * fee_multiplier`, one entry per bar-pair
//! (`bars - 1` entries), starting implicitly from 1.0.

use crate::strategy::Signal;

/// Simulate a signal sequence against a close column.
///
/// `signals` must come from the same series as `closes` (equal length).
/// `fee_pct` is the per-transition fee in percent (0.5 = 0.5%). Fewer than
/// two bars yield an empty curve.
pub fn simulate(closes: &[f64], signals: &[Signal], fee_pct: f64) -> Vec<f64> {
    debug_assert_eq!(closes.len(), signals.len());
    let n = closes.len();
    if n < 2 {
        return Vec::new();
    }

    let haircut = 1.0 - fee_pct * 0.01;
    let mut equity = Vec::with_capacity(n - 1);
    let mut holding = false;
    let mut acc = 1.0;

    for i in 0..n - 1 {
        // Shifted signal: bar 0 sees Hold, bar i sees the signal from i-1.
        let shifted = if i == 0 { Signal::Hold } else { signals[i - 1] };

        let mut fee = 1.0;
        match shifted {
            Signal::Buy => {
                if !holding {
                    fee = haircut;
                }
                holding = true;
            }
            Signal::Sell => {
                if holding {
                    fee = haircut;
                }
                holding = false;
            }
            Signal::Hold => {}
        }

        let contribution = if holding {
            (closes[i + 1] - closes[i]) / closes[i]
        } else {
            0.0
        };

        acc *= (1.0 + contribution) * fee;
        equity.push(acc);
    }

    equity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn all_hold_is_flat_at_one() {
        let closes = [100.0, 105.0, 95.0, 110.0];
        let equity = simulate(&closes, &[Signal::Hold; 4], 0.5);
        assert_eq!(equity, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn curve_is_one_shorter_than_the_series() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0];
        let equity = simulate(&closes, &[Signal::Hold; 5], 0.0);
        assert_eq!(equity.len(), closes.len() - 1);
    }

    #[test]
    fn empty_and_single_bar_series_yield_empty_curves() {
        assert!(simulate(&[], &[], 0.5).is_empty());
        assert!(simulate(&[100.0], &[Signal::Buy], 0.5).is_empty());
    }

    #[test]
    fn single_round_trip_fee_invariant() {
        // Buy observed at bar 0 enters on the next pair, rides 100 → 110 for
        // one bar, and the sell observed at bar 1 exits on the pair after.
        // Equity at trade close must be (1 + 0.10) * (1 - f/100)^2.
        let closes = [100.0, 100.0, 110.0, 110.0];
        let signals = [Signal::Buy, Signal::Sell, Signal::Hold, Signal::Hold];
        let fee = 0.5;
        let equity = simulate(&closes, &signals, fee);

        let haircut: f64 = 1.0 - fee / 100.0;
        assert_eq!(equity.len(), 3);
        assert_approx(equity[0], 1.0, DEFAULT_EPSILON);
        assert_approx(equity[1], 1.1 * haircut, DEFAULT_EPSILON);
        assert_approx(equity[2], 1.1 * haircut * haircut, DEFAULT_EPSILON);
    }

    #[test]
    fn signal_takes_effect_one_bar_late() {
        // Buy at bar 0 must not capture the 0→1 move.
        let closes = [100.0, 120.0, 120.0];
        let signals = [Signal::Buy, Signal::Hold, Signal::Hold];
        let equity = simulate(&closes, &signals, 0.0);
        assert_approx(equity[0], 1.0, DEFAULT_EPSILON);
        assert_approx(equity[1], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn repeated_buys_pay_a_single_entry_fee() {
        let closes = [100.0, 100.0, 100.0, 100.0, 100.0];
        let signals = [Signal::Buy, Signal::Buy, Signal::Buy, Signal::Hold, Signal::Hold];
        let fee = 1.0;
        let equity = simulate(&closes, &signals, fee);
        // One haircut on entry, none for the redundant buys.
        let haircut = 1.0 - fee / 100.0;
        assert_approx(*equity.last().unwrap(), haircut, DEFAULT_EPSILON);
    }

    #[test]
    fn sell_while_flat_costs_nothing() {
        let closes = [100.0, 100.0, 100.0];
        let signals = [Signal::Sell, Signal::Sell, Signal::Hold];
        let equity = simulate(&closes, &signals, 2.0);
        assert_eq!(equity, vec![1.0, 1.0]);
    }

    #[test]
    fn long_position_tracks_returns() {
        let closes = [100.0, 100.0, 110.0, 99.0];
        let signals = [Signal::Buy, Signal::Hold, Signal::Hold, Signal::Hold];
        let equity = simulate(&closes, &signals, 0.0);
        assert_approx(equity[0], 1.0, DEFAULT_EPSILON);
        assert_approx(equity[1], 1.1, DEFAULT_EPSILON);
        assert_approx(equity[2], 1.1 * (99.0 / 110.0), DEFAULT_EPSILON);
    }
}
