//! Breadth-first state-space exploration through the focus protocol.
//!
//! The explorer is the only place that drives a generator. For each state it
//! focuses once, then asks for the transition count, and per transition the
//! probability, action and target, then evaluates every label. States are
//! numbered densely in discovery order, so the resulting [`StateSpace`] is
//! identical across runs.

use std::collections::HashMap;

use concord_core::{Focused, ModelGenerator, PreconditionError, VarDecl};
use thiserror::Error;

/// Index of the initial state in every [`StateSpace`].
pub const INITIAL_STATE: usize = 0;

/// Default bound on explored states.
pub const DEFAULT_MAX_STATES: usize = 1 << 20;

/// Errors that can occur during exploration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExploreError {
    /// Generator rejected a query
    #[error("generator error: {0}")]
    Generator(#[from] PreconditionError),

    /// Reachable state space is larger than the configured bound
    #[error("state space exceeds {limit} states")]
    StateLimit {
        /// Configured bound
        limit: usize,
    },

    /// A state offers more than one choice
    #[error("state {state} offers {choices} choices, only chains are supported")]
    Nondeterministic {
        /// Display form of the offending state
        state: String,
        /// Number of choices offered
        choices: usize,
    },

    /// Encoded state has the wrong number of variables
    #[error("state {state} encodes {found} values, {expected} variables are declared")]
    ValueCount {
        /// Display form of the offending state
        state: String,
        /// Number of declared variables
        expected: usize,
        /// Number of encoded values
        found: usize,
    },

    /// Encoded value lies outside its variable's declared range
    #[error("state {state}: {variable} = {value} is outside [{low}, {high}]")]
    ValueOutOfRange {
        /// Display form of the offending state
        state: String,
        /// Variable name
        variable: String,
        /// Encoded value
        value: i64,
        /// Inclusive lower bound
        low: i64,
        /// Inclusive upper bound
        high: i64,
    },
}

/// Exploration configuration.
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    /// Maximum number of states to store, the initial state included
    pub max_states: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self { max_states: DEFAULT_MAX_STATES }
    }
}

/// An explored transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Index of the target state
    pub target: usize,
    /// Transition probability
    pub probability: f64,
    /// Action label, if any
    pub action: Option<&'static str>,
}

/// Explicit state graph built from a generator.
///
/// State 0 is always the initial state.
#[derive(Debug, Clone)]
pub struct StateSpace<S> {
    states: Vec<S>,
    values: Vec<Vec<i64>>,
    transitions: Vec<Vec<Transition>>,
    labels: Vec<Vec<bool>>,
    label_names: Vec<&'static str>,
    var_names: Vec<String>,
}

impl<S> StateSpace<S> {
    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if no state was explored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All states in index order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// State at `index`.
    pub fn state(&self, index: usize) -> Option<&S> {
        self.states.get(index)
    }

    /// Variable values of the state at `index`.
    pub fn values(&self, index: usize) -> &[i64] {
        self.values.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing transitions of the state at `index`.
    pub fn transitions(&self, index: usize) -> &[Transition] {
        self.transitions.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of transitions.
    pub fn num_transitions(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    /// Declared variable names.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Declared label names.
    pub fn label_names(&self) -> &[&'static str] {
        &self.label_names
    }

    /// Truth of label `label` in the state at `index`.
    pub fn label(&self, index: usize, label: usize) -> bool {
        self.labels.get(index).and_then(|l| l.get(label)).copied().unwrap_or(false)
    }

    /// Per-state truth vector of a label, or `None` if the label is unknown.
    pub fn labelled(&self, name: &str) -> Option<Vec<bool>> {
        let label = self.label_names.iter().position(|l| *l == name)?;
        Some((0..self.len()).map(|i| self.label(i, label)).collect())
    }

    /// True if the state at `index` only loops back to itself.
    pub fn is_absorbing(&self, index: usize) -> bool {
        let row = self.transitions(index);
        !row.is_empty() && row.iter().all(|t| t.target == index)
    }

    /// Per-state absorbing flags.
    pub fn absorbing(&self) -> Vec<bool> {
        (0..self.len()).map(|i| self.is_absorbing(i)).collect()
    }
}

/// Explore every state reachable from the generator's initial state.
///
/// Every state's encoding is checked against the declared variables.
pub fn explore<G: ModelGenerator>(
    generator: &G,
    config: &ExploreConfig,
) -> Result<StateSpace<G::State>, ExploreError> {
    if config.max_states == 0 {
        return Err(ExploreError::StateLimit { limit: 0 });
    }

    let label_count = generator.label_names().len();
    let decls = generator.var_decls();
    let initial = generator.initial_state();

    let mut index: HashMap<G::State, usize> = HashMap::new();
    index.insert(initial.clone(), INITIAL_STATE);

    let mut space = StateSpace {
        states: vec![initial],
        values: Vec::new(),
        transitions: Vec::new(),
        labels: Vec::new(),
        label_names: generator.label_names().to_vec(),
        var_names: generator.var_names(),
    };

    // States are discovered in index order, so processing by index is BFS.
    let mut current = 0;
    while current < space.states.len() {
        let state = space.states[current].clone();
        let focus = generator.focus(&state)?;

        let choices = focus.num_choices();
        if choices != 1 {
            return Err(ExploreError::Nondeterministic { state: state.to_string(), choices });
        }

        let count = focus.num_transitions(0)?;
        let mut row = Vec::with_capacity(count);
        for offset in 0..count {
            let probability = focus.transition_probability(0, offset)?;
            let action = focus.transition_action(0, offset)?;
            let target = focus.transition_target(0, offset)?;

            let target = match index.get(&target) {
                Some(&existing) => existing,
                None => {
                    if space.states.len() >= config.max_states {
                        return Err(ExploreError::StateLimit { limit: config.max_states });
                    }
                    let next = space.states.len();
                    index.insert(target.clone(), next);
                    space.states.push(target);
                    next
                },
            };
            row.push(Transition { target, probability, action });
        }

        let labels = (0..label_count)
            .map(|label| focus.is_label_true(label))
            .collect::<Result<Vec<_>, _>>()?;

        space.values.push(encode(generator, &decls, &state)?);
        space.transitions.push(row);
        space.labels.push(labels);
        current += 1;
    }

    tracing::debug!(
        states = space.len(),
        transitions = space.num_transitions(),
        "exploration complete"
    );

    Ok(space)
}

/// Encode `state` and check the values against their declarations.
fn encode<G: ModelGenerator>(
    generator: &G,
    decls: &[VarDecl],
    state: &G::State,
) -> Result<Vec<i64>, ExploreError> {
    let values = generator.state_values(state);
    if values.len() != decls.len() {
        return Err(ExploreError::ValueCount {
            state: state.to_string(),
            expected: decls.len(),
            found: values.len(),
        });
    }

    for (decl, &value) in decls.iter().zip(&values) {
        let (low, high) = decl.ty.bounds();
        if !(low..=high).contains(&value) {
            return Err(ExploreError::ValueOutOfRange {
                state: state.to_string(),
                variable: decl.name.clone(),
                value,
                low,
                high,
            });
        }
    }
    Ok(values)
}
