//! Fuzz target for configuration validation and exploration
//!
//! Arbitrary probability lists and pattern strings are fed through model
//! construction. Whatever is accepted must explore to a well-formed chain.
//!
//! # Invariants
//!
//! - Construction never panics; invalid input yields a ConfigError
//! - Accepted probabilities all lie in [0, 1]
//! - Every accepted model passes the consensus invariant registry
//! - P(F end) lies in [0, 1]

#![no_main]

use arbitrary::Arbitrary;
use concord_core::{ModelConfig, Pattern};
use concord_harness::{
    ExploreConfig, InvariantRegistry, SolverConfig, SpaceSnapshot, explore, label_probability,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct ConfigInput {
    participants: u8,
    probabilities: Vec<f64>,
    patterns: Vec<String>,
}

fuzz_target!(|input: ConfigInput| {
    let parsed: Result<Vec<Pattern>, _> = input.patterns.iter().map(|p| p.parse()).collect();
    let Ok(patterns) = parsed else {
        return;
    };
    let config = ModelConfig {
        participants: usize::from(input.participants % 10),
        probabilities: input.probabilities,
        patterns,
    };

    let Ok(model) = config.build() else {
        return;
    };
    assert!(model.registry().probabilities().iter().all(|p| (0.0..=1.0).contains(p)));

    let space = explore(&model, &ExploreConfig::default()).expect("bounded round explores");
    InvariantRegistry::for_consensus(model.participants())
        .assert_all(&SpaceSnapshot::from_space(&space), "fuzzed config");

    let p = label_probability(&space, "end", &SolverConfig::default()).expect("solvable");
    assert!((0.0..=1.0 + 1e-12).contains(&p), "P(F end) = {p}");
});
