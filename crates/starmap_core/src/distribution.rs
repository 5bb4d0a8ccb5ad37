//! Discrete probability tables: normalization check and weighted draws.
//!
//! A table that represents a complete sample space must sum to 1 within
//! [`TOLERANCE`]. A table that does not is a content authoring defect and is
//! rejected by catalog validation, never corrected at runtime.

use std::collections::BTreeMap;

use rand::distributions::{Distribution as _, WeightedIndex};
use rand::Rng;

/// Absolute tolerance on `|1 - sum|`.
pub const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("distribution has no entries")]
    Empty,
    #[error("weight for '{key}' is {weight}, expected a value in [0, 1]")]
    InvalidWeight { key: String, weight: f64 },
    #[error("weights sum to {sum}, which deviates from 1 by {deviation}")]
    NotNormalized { sum: f64, deviation: f64 },
}

/// Returns `|1 - Σ weights|` for the table.
///
/// Pure: the same table always yields the same value. An empty table yields 1.
pub fn distribution_deviation<K>(table: &BTreeMap<K, f64>) -> f64 {
    let sum: f64 = table.values().sum();
    (1.0 - sum).abs()
}

/// Checks that `table` is a non-empty distribution with weights in [0, 1]
/// summing to 1 within [`TOLERANCE`].
pub fn check_distribution<K: std::fmt::Display>(
    table: &BTreeMap<K, f64>,
) -> Result<(), DistributionError> {
    if table.is_empty() {
        return Err(DistributionError::Empty);
    }
    for (key, &weight) in table {
        if !(0.0..=1.0).contains(&weight) {
            return Err(DistributionError::InvalidWeight {
                key: key.to_string(),
                weight,
            });
        }
    }
    let deviation = distribution_deviation(table);
    if deviation < TOLERANCE {
        Ok(())
    } else {
        Err(DistributionError::NotNormalized {
            sum: table.values().sum(),
            deviation,
        })
    }
}

/// Draws one key from `table` with probability proportional to its weight.
///
/// Zero-weight keys are never drawn. The table does not have to be
/// normalized; an empty or all-zero table is an error.
pub fn sample<K: Copy + std::fmt::Display>(
    table: &BTreeMap<K, f64>,
    rng: &mut impl Rng,
) -> Result<K, DistributionError> {
    if let Some((key, &weight)) = table.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
        return Err(DistributionError::InvalidWeight {
            key: key.to_string(),
            weight,
        });
    }
    let keys: Vec<K> = table.keys().copied().collect();
    // Remaining failures are "no items" and "all weights zero".
    let index =
        WeightedIndex::new(table.values().copied()).map_err(|_| DistributionError::Empty)?;
    Ok(keys[index.sample(rng)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn star_types(wormhole: f64) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("star", 0.90),
            ("black_hole", 0.05),
            ("neutron_star", 0.04),
            ("wormhole", wormhole),
        ])
    }

    #[test]
    fn normalized_table_is_within_tolerance() {
        let table = star_types(0.01);
        assert!(distribution_deviation(&table) < TOLERANCE);
        assert!(check_distribution(&table).is_ok());
    }

    #[test]
    fn corrupted_table_deviates_by_excess_weight() {
        let table = star_types(0.02);
        let deviation = distribution_deviation(&table);
        assert!((deviation - 0.01).abs() < 1e-12, "deviation was {deviation}");
        assert!(deviation >= TOLERANCE);
        match check_distribution(&table) {
            Err(DistributionError::NotNormalized { deviation, .. }) => {
                assert!((deviation - 0.01).abs() < 1e-12);
            }
            other => panic!("expected NotNormalized, got {other:?}"),
        }
    }

    #[test]
    fn deviation_is_repeatable() {
        let table = star_types(0.02);
        let first = distribution_deviation(&table);
        for _ in 0..10 {
            assert_eq!(distribution_deviation(&table).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let table: BTreeMap<&str, f64> = BTreeMap::new();
        assert_eq!(check_distribution(&table), Err(DistributionError::Empty));
        assert!(distribution_deviation(&table) >= TOLERANCE);
    }

    #[test]
    fn negative_weight_is_rejected_even_if_sum_is_one() {
        let table = BTreeMap::from([("a", 1.5), ("b", -0.5)]);
        match check_distribution(&table) {
            Err(DistributionError::InvalidWeight { key, .. }) => assert_eq!(key, "a"),
            other => panic!("expected InvalidWeight, got {other:?}"),
        }
    }

    #[test]
    fn sample_never_draws_zero_weight_keys() {
        let table = BTreeMap::from([("never", 0.0), ("always", 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(sample(&table, &mut rng).unwrap(), "always");
        }
    }

    #[test]
    fn sample_is_deterministic_for_a_seed() {
        let table = star_types(0.01);
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let a: Vec<_> = (0..50).map(|_| sample(&table, &mut rng1).unwrap()).collect();
        let b: Vec<_> = (0..50).map(|_| sample(&table, &mut rng2).unwrap()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn sample_frequencies_follow_weights() {
        let table = BTreeMap::from([("rare", 0.1), ("common", 0.9)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let draws: u32 = 10_000;
        let common = (0..draws)
            .filter(|_| sample(&table, &mut rng).unwrap() == "common")
            .count();
        let share = common as f64 / f64::from(draws);
        assert!((share - 0.9).abs() < 0.02, "common share was {share}");
    }

    #[test]
    fn sample_rejects_empty_and_all_zero_tables() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let empty: BTreeMap<&str, f64> = BTreeMap::new();
        assert_eq!(sample(&empty, &mut rng), Err(DistributionError::Empty));
        let zeros = BTreeMap::from([("a", 0.0), ("b", 0.0)]);
        assert_eq!(sample(&zeros, &mut rng), Err(DistributionError::Empty));
    }
}
