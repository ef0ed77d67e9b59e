//! Fuzz target for the focus protocol with arbitrary engine queries
//!
//! An engine may hand the generator any variable vector and ask any query on
//! the resulting focus. Malformed vectors and out-of-range indices must be
//! rejected with a structured error.
//!
//! # Invariants
//!
//! - Decoding never panics; accepted vectors re-encode to a valid state
//! - Focus succeeds for every decoded state
//! - Queries with in-range indices always succeed
//! - Probabilities lie in [0, 1] and each row sums to 1
//! - Targets are never more than one step ahead of the source

#![no_main]

use arbitrary::Arbitrary;
use concord_core::{Focused, ModelConfig, ModelGenerator, Pattern, ProcessState, Reply};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct FocusScenario {
    participants: u8,
    probabilities: Vec<u8>,
    patterns: Vec<Vec<bool>>,
    vars: Vec<i64>,
    queries: Vec<Query>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Query {
    Transitions { choice: u8 },
    Action { choice: u8, offset: u8 },
    Probability { choice: u8, offset: u8 },
    Target { choice: u8, offset: u8 },
    Label { index: u8 },
}

fuzz_target!(|scenario: FocusScenario| {
    let n = usize::from(scenario.participants % 12);
    let probabilities: Vec<f64> = (0..n)
        .map(|i| f64::from(scenario.probabilities.get(i).copied().unwrap_or(128)) / 255.0)
        .collect();
    let patterns = scenario
        .patterns
        .iter()
        .map(|bits| {
            Pattern::new((0..n).map(|i| Reply::from(bits.get(i).copied().unwrap_or(false))).collect())
        })
        .collect();

    let Ok(model) = (ModelConfig { participants: n, probabilities, patterns }).build() else {
        return;
    };

    let Ok(state) = ProcessState::from_vars(&scenario.vars, n) else {
        return;
    };
    assert_eq!(ProcessState::from_vars(&state.to_vars(), n).as_ref(), Ok(&state));

    let focus = model.focus(&state).expect("decoded states are valid");
    let count = focus.num_transitions(0).expect("choice 0 exists");
    let sum: f64 = (0..count).map(|o| focus.transition_probability(0, o).expect("in range")).sum();
    assert!((sum - 1.0).abs() <= 1e-12, "row sums to {sum}");

    for query in scenario.queries {
        match query {
            Query::Transitions { choice } => {
                let result = focus.num_transitions(usize::from(choice));
                assert_eq!(result.is_ok(), choice == 0);
            },
            Query::Action { choice, offset } => {
                let _ = focus.transition_action(usize::from(choice), usize::from(offset));
            },
            Query::Probability { choice, offset } => {
                let (choice, offset) = (usize::from(choice), usize::from(offset));
                if let Ok(p) = focus.transition_probability(choice, offset) {
                    assert!((0.0..=1.0).contains(&p));
                }
            },
            Query::Target { choice, offset } => {
                let (choice, offset) = (usize::from(choice), usize::from(offset));
                if let Ok(target) = focus.transition_target(choice, offset) {
                    assert!(target.step() == state.step() || target.step() == state.step() + 1);
                    assert!(target.step() <= n);
                }
            },
            Query::Label { index } => {
                let result = focus.is_label_true(usize::from(index));
                assert_eq!(result.is_ok(), index == 0);
            },
        }
    }
});
