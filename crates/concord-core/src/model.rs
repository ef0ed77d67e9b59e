//! Engine-facing contracts.
//!
//! An exploring engine sees a generator through three capability sets:
//!
//! - [`ModelInfo`]: static declarations (model kind, variables, labels)
//! - [`ModelGenerator`]: initial state and the focus protocol
//! - [`RewardSource`]: named reward structures
//!
//! # Focus protocol
//!
//! [`ModelGenerator::focus`] validates a state and returns a [`Focused`]
//! context. All transition and label queries are made on that context, so a
//! query can never be issued before a focus, and a new focus never disturbs
//! queries still in flight on an older one.
//!
//! ```text
//! engine ──focus(s)──> Focused ──num_transitions / probability / target / label──> engine
//! ```
//!
//! A single context is meant to be used serially by one caller. Generators
//! themselves hold only read-only configuration.

use std::{fmt, hash::Hash};

use crate::error::PreconditionError;

/// Kind of stochastic process a generator describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Discrete-time Markov chain: one choice per state, no nondeterminism.
    Dtmc,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dtmc => write!(f, "dtmc"),
        }
    }
}

/// Type of a model variable, used by the engine for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    /// Integer within `[low, high]`
    BoundedInt {
        /// Inclusive lower bound
        low: i64,
        /// Inclusive upper bound
        high: i64,
    },
    /// Binary value, 0 or 1
    Binary,
}

impl VarType {
    /// Inclusive value range of the variable.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Self::BoundedInt { low, high } => (low, high),
            Self::Binary => (0, 1),
        }
    }
}

/// A declared model variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarDecl {
    /// Variable name
    pub name: String,
    /// Variable type
    pub ty: VarType,
}

impl VarDecl {
    /// Declare a variable.
    pub fn new(name: impl Into<String>, ty: VarType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Static model declarations.
pub trait ModelInfo {
    /// Kind of process.
    fn model_kind(&self) -> ModelKind;

    /// Ordered variable declarations.
    fn var_decls(&self) -> Vec<VarDecl>;

    /// Declared label names, indexed by label index.
    fn label_names(&self) -> &[&'static str];

    /// Variable names in declaration order.
    fn var_names(&self) -> Vec<String> {
        self.var_decls().into_iter().map(|decl| decl.name).collect()
    }

    /// Variable types in declaration order.
    fn var_types(&self) -> Vec<VarType> {
        self.var_decls().into_iter().map(|decl| decl.ty).collect()
    }

    /// Index of a label by name.
    fn label_index(&self, name: &str) -> Option<usize> {
        self.label_names().iter().position(|label| *label == name)
    }
}

/// On-the-fly state generator.
pub trait ModelGenerator: ModelInfo {
    /// State type. Value semantics: equal states are the same logical state.
    type State: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Query context bound to one focused state.
    type Focus<'a>: Focused<State = Self::State>
    where
        Self: 'a;

    /// Initial state of the process.
    fn initial_state(&self) -> Self::State;

    /// Validate `state` and bind a query context to it.
    fn focus<'a>(&'a self, state: &Self::State) -> Result<Self::Focus<'a>, PreconditionError>;

    /// Encode `state` as variable values in declaration order.
    fn state_values(&self, state: &Self::State) -> Vec<i64>;
}

/// Queries on a focused state.
///
/// Transitions are addressed by `(choice, offset)`. For a chain there is
/// always exactly one choice, index 0.
pub trait Focused {
    /// State type of the owning generator.
    type State;

    /// The focused state.
    fn state(&self) -> &Self::State;

    /// Number of nondeterministic choices.
    fn num_choices(&self) -> usize;

    /// Number of probabilistic transitions within `choice`.
    fn num_transitions(&self, choice: usize) -> Result<usize, PreconditionError>;

    /// Action label of a transition. `None` for unlabelled transitions.
    fn transition_action(
        &self,
        choice: usize,
        offset: usize,
    ) -> Result<Option<&'static str>, PreconditionError>;

    /// Probability of a transition.
    fn transition_probability(&self, choice: usize, offset: usize)
    -> Result<f64, PreconditionError>;

    /// Target state of a transition.
    fn transition_target(
        &self,
        choice: usize,
        offset: usize,
    ) -> Result<Self::State, PreconditionError>;

    /// Truth of label `label` in the focused state.
    fn is_label_true(&self, label: usize) -> Result<bool, PreconditionError>;
}

/// Named reward structures.
pub trait RewardSource {
    /// State type rewards are assigned to.
    type State;

    /// Declared reward structure names, indexed by structure index.
    fn reward_struct_names(&self) -> &[&'static str];

    /// Reward earned in `state` under `structure`.
    fn state_reward(&self, structure: usize, state: &Self::State)
    -> Result<f64, PreconditionError>;

    /// Reward earned by taking `action` in `state` under `structure`.
    fn state_action_reward(
        &self,
        structure: usize,
        state: &Self::State,
        action: Option<&str>,
    ) -> Result<f64, PreconditionError>;

    /// Index of a reward structure by name.
    fn reward_struct_index(&self, name: &str) -> Option<usize> {
        self.reward_struct_names().iter().position(|r| *r == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_type_bounds() {
        assert_eq!(VarType::Binary.bounds(), (0, 1));
        assert_eq!(VarType::BoundedInt { low: 0, high: 4 }.bounds(), (0, 4));
    }

    #[test]
    fn model_kind_display() {
        assert_eq!(ModelKind::Dtmc.to_string(), "dtmc");
    }
}
