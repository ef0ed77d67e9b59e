//! Concrete walk-throughs of the two-participant round.
//!
//! Two participants, each confirming with probability 0.5, accepted only when
//! both confirm.

use concord_core::{
    ConfigError, Focused, ModelConfig, ModelGenerator, ModelInfo, Pattern, PreconditionError,
    ProcessState, Reply, RewardSource,
};

fn leaf(replies: [Reply; 2]) -> ProcessState {
    ProcessState::new(2, replies.to_vec())
}

#[test]
fn initial_state_branches_evenly() {
    let model = ModelConfig::default().build().expect("default config");
    let initial = model.initial_state();
    assert_eq!(initial, ProcessState::initial(2));

    let focus = model.focus(&initial).expect("focus initial");
    assert_eq!(focus.num_transitions(0), Ok(2));
    assert_eq!(focus.transition_probability(0, 0), Ok(0.5));
    assert_eq!(focus.transition_probability(0, 1), Ok(0.5));
}

#[test]
fn confirm_then_branch_again() {
    let model = ModelConfig::default().build().expect("default config");
    let focus = model.focus(&model.initial_state()).expect("focus initial");

    let confirmed = focus.transition_target(0, 1).expect("confirm target");
    assert_eq!(confirmed, ProcessState::new(1, vec![Reply::Confirm, Reply::Refuse]));
    assert_eq!(confirmed.to_string(), "(step=1, replies=[1,_])");

    let next = model.focus(&confirmed).expect("focus step 1");
    assert_eq!(next.transition_probability(0, 0), Ok(0.5));
    assert_eq!(next.transition_probability(0, 1), Ok(0.5));
}

#[test]
fn four_leaves_each_quarter_only_one_accepted() {
    let model = ModelConfig::default().build().expect("default config");
    let root = model.focus(&model.initial_state()).expect("focus initial");

    let mut leaves = Vec::new();
    for first in 0..2 {
        let p1 = root.transition_probability(0, first).expect("p1");
        let mid = root.transition_target(0, first).expect("mid");
        let focus = model.focus(&mid).expect("focus mid");
        for second in 0..2 {
            let p2 = focus.transition_probability(0, second).expect("p2");
            let target = focus.transition_target(0, second).expect("leaf");
            let accepted =
                model.focus(&target).expect("focus leaf").is_label_true(0).expect("label");
            leaves.push((target, p1 * p2, accepted));
        }
    }

    use Reply::{Confirm as C, Refuse as R};
    let expected = [
        (leaf([R, R]), 0.25, false),
        (leaf([R, C]), 0.25, false),
        (leaf([C, R]), 0.25, false),
        (leaf([C, C]), 0.25, true),
    ];
    assert_eq!(leaves, expected);
}

#[test]
fn empty_round_is_accepted_immediately() {
    let config = ModelConfig {
        participants: 0,
        probabilities: Vec::new(),
        patterns: vec![Pattern::new(Vec::new())],
    };
    let model = config.build().expect("empty config");
    let focus = model.focus(&model.initial_state()).expect("focus initial");

    assert_eq!(focus.num_transitions(0), Ok(1));
    assert_eq!(focus.transition_probability(0, 0), Ok(1.0));
    assert_eq!(focus.transition_target(0, 0), Ok(model.initial_state()));
    assert_eq!(focus.is_label_true(0), Ok(true));
}

#[test]
fn engine_encodings_round_trip_through_focus() {
    let model = ModelConfig::default().build().expect("default config");
    assert_eq!(model.var_names(), vec!["x", "o0", "o1"]);

    let state = ProcessState::from_vars(&[2, 1, 1], model.participants()).expect("decode");
    assert_eq!(model.state_values(&state), vec![2, 1, 1]);
    assert_eq!(model.focus(&state).expect("focus").is_label_true(0), Ok(true));

    assert_eq!(
        ProcessState::from_vars(&[1, 0, 5], model.participants()),
        Err(PreconditionError::ReplyOutOfBounds { index: 1, value: 5 })
    );
}

#[test]
fn rewards_count_steps() {
    let model = ModelConfig::default().build().expect("default config");
    let r = model.reward_struct_index("r").expect("reward structure r");
    assert_eq!(model.state_reward(r, &model.initial_state()), Ok(1.0));
    assert_eq!(model.state_reward(r, &leaf([Reply::Confirm; 2])), Ok(1.0));
    assert_eq!(model.state_action_reward(r, &model.initial_state(), None), Ok(0.0));
}

#[test]
fn malformed_configuration_builds_nothing() {
    let config = ModelConfig {
        participants: 2,
        probabilities: vec![0.5, 2.0],
        patterns: vec!["11".parse().expect("pattern")],
    };
    assert_eq!(
        config.build(),
        Err(ConfigError::ProbabilityOutOfRange { participant: 1, value: 2.0 })
    );
}
