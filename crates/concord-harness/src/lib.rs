//! Checking harness for Concord model generators.
//!
//! Plays the part of the external engine a generator is written for: it
//! drives the focus protocol to build the explicit chain, checks structural
//! invariants on it, and answers reachability and reward queries.
//!
//! # Exploration
//!
//! [`explore`] walks every reachable state breadth-first and records the
//! transition rows and label truth values in a [`StateSpace`].
//!
//! # Invariant Testing
//!
//! The `invariants` module checks what must hold of every explored chain
//! (stochastic rows, absorbing self-loops, tree shape). Use
//! [`InvariantRegistry::for_consensus()`] for a consensus round.
//!
//! # Analysis
//!
//! The `solver` module computes `P=? [F label]` and expected rewards to
//! absorption. [`PathSampler`] gives seeded Monte Carlo estimates of the same
//! quantities for cross-checking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dot;
pub mod explorer;
pub mod invariants;
pub mod sampler;
pub mod solver;

pub use dot::{to_dot, write_dot};
pub use explorer::{
    DEFAULT_MAX_STATES, ExploreConfig, ExploreError, INITIAL_STATE, StateSpace, Transition,
    explore,
};
pub use invariants::{
    DeadlockFree, FiniteTree, Invariant, InvariantRegistry, InvariantResult,
    LabelsOnlyWhenAbsorbing, SelfLoopsAbsorb, SpaceSnapshot, StateSnapshot, StochasticRows,
    Violation,
};
pub use sampler::{PathSampler, SampleEstimate, SampledPath};
pub use solver::{
    SolveError, SolverConfig, expected_reward, expected_reward_to_absorption, label_probability,
    reachability, state_rewards,
};
