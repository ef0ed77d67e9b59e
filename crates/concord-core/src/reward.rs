//! Reward assignment for expected-step analysis.
//!
//! A single structure, `r`, pays 1 per state. Paired with a reachability
//! target, its expected cumulative value is the expected number of steps
//! taken before the target is reached.

use crate::{
    error::PreconditionError, generator::ConsensusModel, model::RewardSource,
    state::ProcessState,
};

/// Name of the step-counting reward structure.
pub const STEP_REWARD: &str = "r";

/// Reward paid by every state under [`STEP_REWARD`].
pub const STATE_REWARD: f64 = 1.0;

const REWARD_STRUCTS: [&str; 1] = [STEP_REWARD];

fn check_structure(structure: usize) -> Result<(), PreconditionError> {
    if structure >= REWARD_STRUCTS.len() {
        return Err(PreconditionError::RewardStructOutOfRange {
            index: structure,
            available: REWARD_STRUCTS.len(),
        });
    }
    Ok(())
}

impl RewardSource for ConsensusModel {
    type State = ProcessState;

    fn reward_struct_names(&self) -> &[&'static str] {
        &REWARD_STRUCTS
    }

    fn state_reward(
        &self,
        structure: usize,
        _state: &ProcessState,
    ) -> Result<f64, PreconditionError> {
        check_structure(structure)?;
        Ok(STATE_REWARD)
    }

    fn state_action_reward(
        &self,
        structure: usize,
        _state: &ProcessState,
        _action: Option<&str>,
    ) -> Result<f64, PreconditionError> {
        check_structure(structure)?;
        Ok(0.0)
    }
}
