//! Trial ledger — records and equity curves accumulated by one
//! optimization batch.

use crate::record::{DatasetId, RunRecord};
use alphalab_core::strategy::StrategyKind;

/// Collection of run records plus their equity curves, scoped to one
/// (strategy, dataset) pair. Built by the optimizer, then handed to the
/// caller for storage or display. Records and curves stay parallel: the
/// curve for `records()[i]` is `equity(i)`.
#[derive(Debug, Clone)]
pub struct TrialLedger {
    strategy: StrategyKind,
    dataset: DatasetId,
    records: Vec<RunRecord>,
    equities: Vec<Vec<f64>>,
}

impl TrialLedger {
    pub fn new(strategy: StrategyKind, dataset: DatasetId) -> Self {
        Self {
            strategy,
            dataset,
            records: Vec::new(),
            equities: Vec::new(),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn dataset(&self) -> &DatasetId {
        &self.dataset
    }

    pub fn push(&mut self, record: RunRecord, equity: Vec<f64>) {
        self.records.push(record);
        self.equities.push(equity);
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn equity(&self, index: usize) -> Option<&[f64]> {
        self.equities.get(index).map(Vec::as_slice)
    }

    pub fn equities(&self) -> &[Vec<f64>] {
        &self.equities
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indices of records ranked by profit, best first.
    pub fn ranked_by_profit(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| {
            self.records[b]
                .stats
                .profit_pct
                .partial_cmp(&self.records[a].stats.profit_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }

    /// The best record by profit, with its index.
    pub fn best(&self) -> Option<(usize, &RunRecord)> {
        self.ranked_by_profit()
            .first()
            .map(|&i| (i, &self.records[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphalab_core::stats::Stats;
    use alphalab_core::strategy::ParamSet;

    fn record_with_profit(profit: f64) -> RunRecord {
        let dataset = DatasetId::new("BTC-USD", "365d", "1d");
        let mut record = RunRecord::new(
            &dataset,
            StrategyKind::MeanReversion,
            &ParamSet::new(),
            Stats::zeroed(),
        );
        record.stats.profit_pct = profit;
        record
    }

    #[test]
    fn records_and_equities_stay_parallel() {
        let mut ledger = TrialLedger::new(
            StrategyKind::MeanReversion,
            DatasetId::new("BTC-USD", "365d", "1d"),
        );
        ledger.push(record_with_profit(1.0), vec![1.0, 1.01]);
        ledger.push(record_with_profit(-2.0), vec![1.0, 0.98]);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.equity(0), Some(&[1.0, 1.01][..]));
        assert_eq!(ledger.equity(1), Some(&[1.0, 0.98][..]));
        assert_eq!(ledger.equity(2), None);
    }

    #[test]
    fn ranking_is_best_profit_first() {
        let mut ledger = TrialLedger::new(
            StrategyKind::MeanReversion,
            DatasetId::new("BTC-USD", "365d", "1d"),
        );
        ledger.push(record_with_profit(1.0), vec![]);
        ledger.push(record_with_profit(7.5), vec![]);
        ledger.push(record_with_profit(-3.0), vec![]);

        assert_eq!(ledger.ranked_by_profit(), vec![1, 0, 2]);
        let (best_idx, best) = ledger.best().unwrap();
        assert_eq!(best_idx, 1);
        assert_eq!(best.stats.profit_pct, 7.5);
    }

    #[test]
    fn empty_ledger_has_no_best() {
        let ledger = TrialLedger::new(
            StrategyKind::Bollinger,
            DatasetId::new("ETH-USD", "90d", "1h"),
        );
        assert!(ledger.is_empty());
        assert!(ledger.best().is_none());
    }
}
