//! Property-based tests over explored chains.
//!
//! Every valid configuration must explore to a well-formed chain, and the
//! solver must agree with the closed-form probability of the accepted
//! outcomes.

use concord_core::{ModelConfig, Pattern, Reply};
use concord_harness::{
    ExploreConfig, InvariantRegistry, SolverConfig, SpaceSnapshot, explore, label_probability,
};
use proptest::prelude::*;

/// Strategy for a valid configuration with up to six participants.
fn config_strategy() -> impl Strategy<Value = ModelConfig> {
    (0usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..=1.0, n),
            prop::collection::vec(
                prop::collection::vec(any::<bool>().prop_map(Reply::from), n)
                    .prop_map(Pattern::new),
                0..6,
            ),
        )
            .prop_map(move |(probabilities, patterns)| ModelConfig {
                participants: n,
                probabilities,
                patterns,
            })
    })
}

/// Probability of producing exactly `pattern`.
fn outcome_probability(probabilities: &[f64], pattern: &Pattern) -> f64 {
    probabilities
        .iter()
        .zip(pattern.replies())
        .map(|(p, reply)| match reply {
            Reply::Confirm => *p,
            Reply::Refuse => 1.0 - p,
        })
        .product()
}

proptest! {
    #[test]
    fn prop_explored_chains_are_well_formed(config in config_strategy()) {
        let model = config.build().expect("valid config");
        let space = explore(&model, &ExploreConfig::default()).expect("explorable");

        let registry = InvariantRegistry::for_consensus(config.participants);
        let result = registry.check_all(&SpaceSnapshot::from_space(&space));
        prop_assert!(result.is_ok(), "violations: {:?}", result);

        // PROPERTY: a round with n participants has 2^n outcomes
        prop_assert_eq!(space.absorbing().iter().filter(|a| **a).count(), 1 << config.participants);
    }

    #[test]
    fn prop_end_probability_is_sum_of_accepted_outcomes(config in config_strategy()) {
        let model = config.build().expect("valid config");
        let space = explore(&model, &ExploreConfig::default()).expect("explorable");
        let p = label_probability(&space, "end", &SolverConfig::default()).expect("solvable");

        // Duplicate patterns collapse into one accepted outcome.
        let mut distinct = config.patterns.clone();
        distinct.sort();
        distinct.dedup();
        let expected: f64 =
            distinct.iter().map(|pattern| outcome_probability(&config.probabilities, pattern)).sum();

        // PROPERTY: exact membership means outcomes contribute independently
        prop_assert!((p - expected).abs() < 1e-9, "solver {} vs closed form {}", p, expected);
    }
}
