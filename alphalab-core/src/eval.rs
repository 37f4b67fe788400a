//! Evaluation — one strategy instance driven through the full pipeline.
//!
//! Holds the intermediate products (signals, equity curve, statistics) for a
//! single strategy evaluation and enforces their order: the backtest
//! requires signals, the statistics require an equity curve. All data flows
//! through explicit arguments; there is no ambient session state.

use crate::backtest::simulate;
use crate::error::CoreError;
use crate::stats::Stats;
use crate::strategy::{ParamSet, Signal, Strategy, COST_PER_TRADE};
use crate::table::IndicatorTable;

/// Default fee in percent when a parameter set carries none.
pub const DEFAULT_COST_PER_TRADE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Evaluation {
    strategy: Strategy,
    trade_fee: f64,
    signals: Option<Vec<Signal>>,
    equity: Option<Vec<f64>>,
    stats: Option<Stats>,
}

impl Evaluation {
    /// Build an evaluation from an instantiated strategy and an explicit fee.
    pub fn new(strategy: Strategy, trade_fee: f64) -> Self {
        Self {
            strategy,
            trade_fee,
            signals: None,
            equity: None,
            stats: None,
        }
    }

    /// Build from a parameter set, taking the fee from `cost_per_trade`
    /// (falling back to the default when absent).
    pub fn from_params(strategy: Strategy, params: &ParamSet) -> Self {
        let fee = params.scalar(COST_PER_TRADE).unwrap_or(DEFAULT_COST_PER_TRADE);
        Self::new(strategy, fee)
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn trade_fee(&self) -> f64 {
        self.trade_fee
    }

    /// Materialize the strategy's indicator columns and generate signals.
    pub fn generate_signals(&mut self, table: &mut IndicatorTable) -> Result<&[Signal], CoreError> {
        table.materialize(&self.strategy.required_keys());
        let signals = self.strategy.generate_signals(table)?;
        Ok(self.signals.insert(signals).as_slice())
    }

    /// Simulate the generated signals into an equity curve.
    pub fn backtest(&mut self, table: &IndicatorTable) -> Result<&[f64], CoreError> {
        let signals = self.signals.as_ref().ok_or(CoreError::SignalsNotReady)?;
        let equity = simulate(table.closes(), signals, self.trade_fee);
        Ok(self.equity.insert(equity).as_slice())
    }

    /// Reduce the equity curve to statistics.
    pub fn compute_stats(&mut self) -> Result<&Stats, CoreError> {
        let equity = self.equity.as_ref().ok_or(CoreError::BacktestNotReady)?;
        Ok(&*self.stats.insert(Stats::compute(equity)))
    }

    pub fn signals(&self) -> Option<&[Signal]> {
        self.signals.as_deref()
    }

    pub fn equity(&self) -> Option<&[f64]> {
        self.equity.as_deref()
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, PriceSeries};
    use crate::indicators::IndicatorKind;
    use crate::strategy::{ParamValue, StrategyKind};
    use chrono::{Duration, TimeZone, Utc};

    fn make_table(closes: &[f64]) -> IndicatorTable {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        IndicatorTable::new(&PriceSeries::new(bars).unwrap())
    }

    fn mean_reversion_params() -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("indicator", ParamValue::Indicator(IndicatorKind::Sma, 2));
        params.insert("margin", ParamValue::Scalar(0.01));
        params.insert(COST_PER_TRADE, ParamValue::Scalar(0.5));
        params
    }

    #[test]
    fn backtest_before_signals_is_not_ready() {
        let params = mean_reversion_params();
        let strategy = Strategy::new(StrategyKind::MeanReversion, &params).unwrap();
        let mut eval = Evaluation::from_params(strategy, &params);
        let table = make_table(&[100.0, 102.0, 104.0]);
        assert_eq!(eval.backtest(&table).unwrap_err(), CoreError::SignalsNotReady);
    }

    #[test]
    fn stats_before_backtest_is_not_ready() {
        let params = mean_reversion_params();
        let strategy = Strategy::new(StrategyKind::MeanReversion, &params).unwrap();
        let mut eval = Evaluation::from_params(strategy, &params);
        let mut table = make_table(&[100.0, 102.0, 104.0]);
        eval.generate_signals(&mut table).unwrap();
        assert_eq!(eval.compute_stats().unwrap_err(), CoreError::BacktestNotReady);
    }

    #[test]
    fn pipeline_runs_in_order() {
        let params = mean_reversion_params();
        let strategy = Strategy::new(StrategyKind::MeanReversion, &params).unwrap();
        let mut eval = Evaluation::from_params(strategy, &params);
        assert_eq!(eval.trade_fee(), 0.5);

        let mut table = make_table(&[100.0, 102.0, 104.0, 101.0, 105.0]);
        let signals = eval.generate_signals(&mut table).unwrap();
        assert_eq!(signals.len(), 5);

        let equity = eval.backtest(&table).unwrap();
        assert_eq!(equity.len(), 4);

        let stats = eval.compute_stats().unwrap();
        assert_eq!(stats.num_trades, 1);
        assert!(eval.signals().is_some());
        assert!(eval.equity().is_some());
        assert!(eval.stats().is_some());
    }

    #[test]
    fn fee_defaults_when_params_carry_none() {
        let mut params = ParamSet::new();
        params.insert("indicator", ParamValue::Indicator(IndicatorKind::Sma, 2));
        params.insert("margin", ParamValue::Scalar(0.01));
        let strategy = Strategy::new(StrategyKind::MeanReversion, &params).unwrap();
        let eval = Evaluation::from_params(strategy, &params);
        assert_eq!(eval.trade_fee(), DEFAULT_COST_PER_TRADE);
    }

    #[test]
    fn empty_series_flows_through_as_empty_outputs() {
        let params = mean_reversion_params();
        let strategy = Strategy::new(StrategyKind::MeanReversion, &params).unwrap();
        let mut eval = Evaluation::from_params(strategy, &params);
        let mut table = make_table(&[]);

        assert!(eval.generate_signals(&mut table).unwrap().is_empty());
        assert!(eval.backtest(&table).unwrap().is_empty());
        assert_eq!(*eval.compute_stats().unwrap(), Stats::zeroed());
    }
}
