//! Deterministic per-trial RNG.
//!
//! A master seed expands into one sub-seed per (strategy, trial index) via
//! BLAKE3 hashing. Because derivation is hash-based rather than sequential,
//! every trial's RNG is independent of worker scheduling: the same master
//! seed produces the same draws whether trials run on one thread or many.

use alphalab_core::strategy::StrategyKind;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Derive the sub-seed for one trial.
pub fn trial_seed(master_seed: u64, strategy: StrategyKind, trial: u64) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(strategy.name().as_bytes());
    hasher.update(&trial.to_le_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[..8].try_into().expect("8-byte prefix"))
}

/// Seeded RNG for one trial's parameter draw.
pub fn trial_rng(master_seed: u64, strategy: StrategyKind, trial: u64) -> StdRng {
    StdRng::seed_from_u64(trial_seed(master_seed, strategy, trial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_seeds_are_deterministic() {
        let a = trial_seed(42, StrategyKind::MeanReversion, 3);
        let b = trial_seed(42, StrategyKind::MeanReversion, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn different_trials_different_seeds() {
        let a = trial_seed(42, StrategyKind::MeanReversion, 0);
        let b = trial_seed(42, StrategyKind::MeanReversion, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn different_strategies_different_seeds() {
        let a = trial_seed(42, StrategyKind::MeanReversion, 0);
        let b = trial_seed(42, StrategyKind::Bollinger, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn different_master_seeds_different_output() {
        let a = trial_seed(42, StrategyKind::Momentum, 0);
        let b = trial_seed(43, StrategyKind::Momentum, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn derivation_is_order_independent() {
        // Deriving trial 5 before trial 2 changes nothing.
        let five_first = trial_seed(7, StrategyKind::RsiThreshold, 5);
        let two_second = trial_seed(7, StrategyKind::RsiThreshold, 2);
        let two_first = trial_seed(7, StrategyKind::RsiThreshold, 2);
        let five_second = trial_seed(7, StrategyKind::RsiThreshold, 5);
        assert_eq!(five_first, five_second);
        assert_eq!(two_first, two_second);
    }
}
