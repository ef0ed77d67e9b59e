//! Property-based tests for the consensus generator.
//!
//! These verify the structural contracts an exploring engine relies on for
//! every valid configuration and every well-formed state, not just the
//! hand-picked examples in the unit tests.

use concord_core::{
    AcceptanceSpec, ConsensusModel, Focused, ModelGenerator, ParticipantRegistry, Pattern,
    ProcessState, Reply,
};
use proptest::prelude::*;

/// Strategy for a configuration: probabilities plus acceptance patterns.
fn arbitrary_config() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<Reply>>)> {
    (0usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..=1.0, n),
            prop::collection::vec(prop::collection::vec(any::<bool>().prop_map(Reply::from), n), 0..5),
        )
    })
}

/// Strategy for a configuration together with a state valid for it.
fn arbitrary_focus() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<Reply>>, ProcessState)> {
    arbitrary_config().prop_flat_map(|(probabilities, patterns)| {
        let n = probabilities.len();
        let state = (0..=n, prop::collection::vec(any::<bool>().prop_map(Reply::from), n))
            .prop_map(|(step, replies)| ProcessState::new(step, replies));
        (Just(probabilities), Just(patterns), state)
    })
}

fn build(probabilities: &[f64], patterns: &[Vec<Reply>]) -> ConsensusModel {
    let n = probabilities.len();
    let registry = ParticipantRegistry::new(n, probabilities.to_vec()).expect("valid registry");
    let spec = AcceptanceSpec::new(n, patterns.iter().cloned().map(Pattern::new))
        .expect("valid specification");
    ConsensusModel::new(registry, spec).expect("valid model")
}

proptest! {
    #[test]
    fn prop_transient_states_branch_stochastically(
        (probabilities, patterns, state) in arbitrary_focus()
    ) {
        let model = build(&probabilities, &patterns);
        let focus = model.focus(&state).expect("valid state");

        prop_assert_eq!(focus.num_choices(), 1);
        prop_assume!(!state.is_resolved());

        prop_assert_eq!(focus.num_transitions(0), Ok(2));
        let refuse = focus.transition_probability(0, 0).expect("offset 0");
        let confirm = focus.transition_probability(0, 1).expect("offset 1");

        // PROPERTY: outgoing probabilities form a distribution
        prop_assert!((0.0..=1.0).contains(&refuse));
        prop_assert!((0.0..=1.0).contains(&confirm));
        prop_assert!((refuse + confirm - 1.0).abs() <= f64::EPSILON);
        prop_assert_eq!(confirm, probabilities[state.step()]);
    }

    #[test]
    fn prop_targets_advance_one_position(
        (probabilities, patterns, state) in arbitrary_focus()
    ) {
        prop_assume!(!state.is_resolved());
        let model = build(&probabilities, &patterns);
        let focus = model.focus(&state).expect("valid state");

        for (offset, reply) in Reply::ALL.into_iter().enumerate() {
            let target = focus.transition_target(0, offset).expect("valid offset");

            // PROPERTY: step increments, only the current slot changes
            prop_assert_eq!(target.step(), state.step() + 1);
            prop_assert_eq!(&target.resolved_replies()[..state.step()], state.resolved_replies());
            prop_assert_eq!(target.replies()[state.step()], reply);
            prop_assert_ne!(&target, &state);
        }
    }

    #[test]
    fn prop_resolved_states_self_loop(
        (probabilities, patterns, state) in arbitrary_focus()
    ) {
        prop_assume!(state.is_resolved());
        let model = build(&probabilities, &patterns);
        let focus = model.focus(&state).expect("valid state");

        // PROPERTY: single self-loop with probability exactly 1
        prop_assert_eq!(focus.num_transitions(0), Ok(1));
        prop_assert_eq!(focus.transition_probability(0, 0), Ok(1.0));
        prop_assert_eq!(focus.transition_target(0, 0), Ok(state.clone()));
    }

    #[test]
    fn prop_end_label_is_exact_membership(
        (probabilities, patterns, state) in arbitrary_focus()
    ) {
        let model = build(&probabilities, &patterns);
        let focus = model.focus(&state).expect("valid state");

        let expected = state.is_resolved()
            && patterns.iter().any(|pattern| pattern.as_slice() == state.replies());
        prop_assert_eq!(focus.is_label_true(0), Ok(expected));
    }

    #[test]
    fn prop_focus_is_idempotent(
        (probabilities, patterns, state) in arbitrary_focus()
    ) {
        let model = build(&probabilities, &patterns);
        let first = model.focus(&state).expect("valid state");
        let second = model.focus(&state).expect("valid state");

        let transitions = first.num_transitions(0).expect("choice 0");
        prop_assert_eq!(second.num_transitions(0), Ok(transitions));
        for offset in 0..transitions {
            prop_assert_eq!(
                first.transition_probability(0, offset),
                second.transition_probability(0, offset)
            );
            prop_assert_eq!(first.transition_target(0, offset), second.transition_target(0, offset));
        }
        prop_assert_eq!(first.is_label_true(0), second.is_label_true(0));
    }

    #[test]
    fn prop_out_of_bounds_steps_are_rejected(
        (probabilities, patterns) in arbitrary_config(),
        excess in 1usize..4,
    ) {
        let model = build(&probabilities, &patterns);
        let n = probabilities.len();
        let state = ProcessState::new(n + excess, vec![Reply::Refuse; n]);

        let err = model.focus(&state).expect_err("step beyond n");
        prop_assert!(err.is_invalid_state());
    }
}
