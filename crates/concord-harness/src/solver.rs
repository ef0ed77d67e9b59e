//! Numerical analysis of an explored chain.
//!
//! Two queries, mirroring what a probabilistic model checker answers:
//!
//! - `P=? [F target]`: probability of eventually reaching a target set
//! - `R=? [F target]`: expected reward accumulated before reaching it
//!
//! Both first classify states by graph reachability, so that states with
//! probability 0 (or reward infinity) are fixed exactly, then solve the
//! remaining linear system by Gauss-Seidel iteration.

use std::collections::VecDeque;

use concord_core::{ModelGenerator, PreconditionError, RewardSource};
use thiserror::Error;

use crate::explorer::{INITIAL_STATE, StateSpace};

/// Default convergence threshold (maximum absolute change per sweep).
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Default bound on Gauss-Seidel sweeps.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Errors that can occur while solving.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Iteration did not reach the convergence threshold
    #[error("no convergence after {iterations} iterations (residual {residual:e})")]
    NotConverged {
        /// Sweeps performed
        iterations: usize,
        /// Largest change in the final sweep
        residual: f64,
    },

    /// Per-state vector does not match the state space
    #[error("expected {expected} entries, got {actual}")]
    LengthMismatch {
        /// Number of states
        expected: usize,
        /// Entries supplied
        actual: usize,
    },

    /// Label not declared by the model
    #[error("unknown label: {0}")]
    UnknownLabel(String),

    /// Reward structure not declared by the model
    #[error("unknown reward structure: {0}")]
    UnknownRewardStruct(String),

    /// Generator rejected a reward query
    #[error("generator error: {0}")]
    Generator(#[from] PreconditionError),
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Stop once no value changes by more than this in a sweep
    pub epsilon: f64,
    /// Give up after this many sweeps
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { epsilon: DEFAULT_EPSILON, max_iterations: DEFAULT_MAX_ITERATIONS }
    }
}

fn check_len<S>(space: &StateSpace<S>, actual: usize) -> Result<(), SolveError> {
    if actual != space.len() {
        return Err(SolveError::LengthMismatch { expected: space.len(), actual });
    }
    Ok(())
}

/// Reverse adjacency over positive-probability edges.
fn predecessors<S>(space: &StateSpace<S>) -> Vec<Vec<usize>> {
    let mut preds = vec![Vec::new(); space.len()];
    for source in 0..space.len() {
        for t in space.transitions(source) {
            if t.probability > 0.0 {
                preds[t.target].push(source);
            }
        }
    }
    preds
}

/// States that can reach `seeds` through states where `through` holds.
/// Seeds are included.
fn backward_reach(preds: &[Vec<usize>], seeds: &[bool], through: &[bool]) -> Vec<bool> {
    let mut reached = seeds.to_vec();
    let mut queue: VecDeque<usize> = (0..seeds.len()).filter(|&s| seeds[s]).collect();

    while let Some(state) = queue.pop_front() {
        for &pred in &preds[state] {
            if !reached[pred] && through[pred] {
                reached[pred] = true;
                queue.push_back(pred);
            }
        }
    }
    reached
}

/// Gauss-Seidel sweeps over the `free` states until the fixed point of
/// `x[s] = base[s] + sum p * x[t]` is reached.
fn gauss_seidel<S>(
    space: &StateSpace<S>,
    values: &mut [f64],
    base: &[f64],
    free: &[bool],
    config: &SolverConfig,
) -> Result<usize, SolveError> {
    let mut residual = f64::INFINITY;
    for iteration in 1..=config.max_iterations {
        residual = 0.0;
        for state in (0..space.len()).filter(|&s| free[s]) {
            let next = base[state]
                + space
                    .transitions(state)
                    .iter()
                    .filter(|t| t.probability > 0.0)
                    .map(|t| t.probability * values[t.target])
                    .sum::<f64>();
            residual = residual.max((next - values[state]).abs());
            values[state] = next;
        }
        if residual <= config.epsilon {
            tracing::trace!(iteration, "gauss-seidel converged");
            return Ok(iteration);
        }
    }
    Err(SolveError::NotConverged { iterations: config.max_iterations, residual })
}

/// Probability, per state, of eventually reaching a state in `targets`.
pub fn reachability<S>(
    space: &StateSpace<S>,
    targets: &[bool],
    config: &SolverConfig,
) -> Result<Vec<f64>, SolveError> {
    check_len(space, targets.len())?;

    let preds = predecessors(space);
    let everywhere = vec![true; space.len()];
    let can_reach = backward_reach(&preds, targets, &everywhere);

    let mut values: Vec<f64> = targets.iter().map(|&t| if t { 1.0 } else { 0.0 }).collect();
    let free: Vec<bool> = (0..space.len()).map(|s| can_reach[s] && !targets[s]).collect();
    let base = vec![0.0; space.len()];

    let iterations = gauss_seidel(space, &mut values, &base, &free, config)?;
    tracing::debug!(iterations, "reachability solved");
    Ok(values)
}

/// Expected reward, per state, accumulated before reaching `targets`.
///
/// State rewards are earned on leaving a state, so a target state contributes
/// nothing. States that reach the target with probability below 1 have
/// infinite expected reward.
pub fn expected_reward<S>(
    space: &StateSpace<S>,
    rewards: &[f64],
    targets: &[bool],
    config: &SolverConfig,
) -> Result<Vec<f64>, SolveError> {
    check_len(space, targets.len())?;
    check_len(space, rewards.len())?;

    let preds = predecessors(space);
    let everywhere = vec![true; space.len()];
    let can_reach = backward_reach(&preds, targets, &everywhere);

    // Reaching the target is certain unless a state that cannot reach it is
    // reachable without passing through the target first.
    let doomed: Vec<bool> = can_reach.iter().map(|&r| !r).collect();
    let outside: Vec<bool> = targets.iter().map(|&t| !t).collect();
    let uncertain = backward_reach(&preds, &doomed, &outside);

    let mut values: Vec<f64> = (0..space.len())
        .map(|s| if uncertain[s] && !targets[s] { f64::INFINITY } else { 0.0 })
        .collect();
    let free: Vec<bool> = (0..space.len()).map(|s| !uncertain[s] && !targets[s]).collect();

    let iterations = gauss_seidel(space, &mut values, rewards, &free, config)?;
    tracing::debug!(iterations, "expected reward solved");
    Ok(values)
}

/// `P=? [F label]` from the initial state.
pub fn label_probability<S>(
    space: &StateSpace<S>,
    label: &str,
    config: &SolverConfig,
) -> Result<f64, SolveError> {
    let targets =
        space.labelled(label).ok_or_else(|| SolveError::UnknownLabel(label.to_string()))?;
    let values = reachability(space, &targets, config)?;
    Ok(values.get(INITIAL_STATE).copied().unwrap_or(0.0))
}

/// Per-state rewards of the named structure, queried from the generator.
pub fn state_rewards<G>(
    generator: &G,
    space: &StateSpace<<G as ModelGenerator>::State>,
    structure: &str,
) -> Result<Vec<f64>, SolveError>
where
    G: ModelGenerator + RewardSource<State = <G as ModelGenerator>::State>,
{
    let index = generator
        .reward_struct_index(structure)
        .ok_or_else(|| SolveError::UnknownRewardStruct(structure.to_string()))?;
    space
        .states()
        .iter()
        .map(|state| generator.state_reward(index, state).map_err(SolveError::from))
        .collect()
}

/// `R{structure}=? [F absorbing]` from the initial state: expected reward
/// accumulated until the chain settles in an absorbing state.
pub fn expected_reward_to_absorption<G>(
    generator: &G,
    space: &StateSpace<<G as ModelGenerator>::State>,
    structure: &str,
    config: &SolverConfig,
) -> Result<f64, SolveError>
where
    G: ModelGenerator + RewardSource<State = <G as ModelGenerator>::State>,
{
    let rewards = state_rewards(generator, space, structure)?;
    let values = expected_reward(space, &rewards, &space.absorbing(), config)?;
    Ok(values.get(INITIAL_STATE).copied().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use concord_core::ModelConfig;

    use super::*;
    use crate::explorer::{ExploreConfig, explore};

    #[test]
    fn default_round_reaches_end_with_quarter_probability() {
        let model = ModelConfig::default().build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();

        let p = label_probability(&space, "end", &SolverConfig::default()).unwrap();
        assert_eq!(p, 0.25);
    }

    #[test]
    fn unknown_label_is_reported() {
        let model = ModelConfig::default().build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();

        assert_eq!(
            label_probability(&space, "start", &SolverConfig::default()),
            Err(SolveError::UnknownLabel("start".to_string()))
        );
    }

    #[test]
    fn expected_steps_to_absorption() {
        let model = ModelConfig::default().build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();

        let steps =
            expected_reward_to_absorption(&model, &space, "r", &SolverConfig::default()).unwrap();
        assert_eq!(steps, 2.0);
    }

    #[test]
    fn unreachable_target_has_infinite_reward() {
        let model = ModelConfig::default().build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();
        let rewards = state_rewards(&model, &space, "r").unwrap();
        let end = space.labelled("end").unwrap();

        let values = expected_reward(&space, &rewards, &end, &SolverConfig::default()).unwrap();
        assert!(values[INITIAL_STATE].is_infinite());
        // The accepted leaf itself is the target.
        assert_eq!(values[6], 0.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let model = ModelConfig::default().build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();

        assert_eq!(
            reachability(&space, &[true], &SolverConfig::default()),
            Err(SolveError::LengthMismatch { expected: 7, actual: 1 })
        );
    }

    #[test]
    fn iteration_bound_is_enforced() {
        let model = ModelConfig::unanimous(3, 0.5).build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();
        let end = space.labelled("end").unwrap();
        let config = SolverConfig { epsilon: 0.0, max_iterations: 1 };

        let err = reachability(&space, &end, &config).unwrap_err();
        assert!(matches!(err, SolveError::NotConverged { iterations: 1, .. }));
    }
}
