//! Observable snapshots of an explored chain for invariant checking.
//!
//! Snapshots drop the generator's state type and keep only what invariants
//! look at: indices, variable values, weighted edges and true labels. They
//! can also be assembled by hand to exercise invariants against malformed
//! chains.

use crate::explorer::StateSpace;

/// Snapshot of an explored chain. State 0 is the initial state.
#[derive(Debug, Clone, Default)]
pub struct SpaceSnapshot {
    /// Per-state snapshots in index order.
    pub states: Vec<StateSnapshot>,
}

impl SpaceSnapshot {
    /// Create an empty snapshot (no states).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot from hand-built states.
    pub fn from_states(states: Vec<StateSnapshot>) -> Self {
        Self { states }
    }

    /// Extract a snapshot from an explored state space.
    pub fn from_space<S>(space: &StateSpace<S>) -> Self {
        let states = (0..space.len())
            .map(|index| StateSnapshot {
                index,
                values: space.values(index).to_vec(),
                transitions: space
                    .transitions(index)
                    .iter()
                    .map(|t| (t.target, t.probability))
                    .collect(),
                labels: space
                    .label_names()
                    .iter()
                    .enumerate()
                    .filter(|(label, _)| space.label(index, *label))
                    .map(|(_, name)| *name)
                    .collect(),
            })
            .collect();
        Self { states }
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the snapshot has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Snapshot of a single state.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    /// State index.
    pub index: usize,
    /// Variable values in declaration order.
    pub values: Vec<i64>,
    /// Outgoing `(target, probability)` edges.
    pub transitions: Vec<(usize, f64)>,
    /// Labels that hold in this state.
    pub labels: Vec<&'static str>,
}

impl StateSnapshot {
    /// Create a state snapshot with no edges or labels.
    pub fn new(index: usize) -> Self {
        Self { index, ..Default::default() }
    }

    /// Add an outgoing edge.
    pub fn with_transition(mut self, target: usize, probability: f64) -> Self {
        self.transitions.push((target, probability));
        self
    }

    /// Mark a label as holding.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.labels.push(label);
        self
    }

    /// True if some edge loops back to this state.
    pub fn has_self_loop(&self) -> bool {
        self.transitions.iter().any(|(target, _)| *target == self.index)
    }

    /// True if every edge loops back to this state.
    pub fn is_absorbing(&self) -> bool {
        !self.transitions.is_empty()
            && self.transitions.iter().all(|(target, _)| *target == self.index)
    }

    /// Edges to other states.
    pub fn successors(&self) -> impl Iterator<Item = usize> + '_ {
        self.transitions.iter().map(|(target, _)| *target).filter(move |t| *t != self.index)
    }
}
