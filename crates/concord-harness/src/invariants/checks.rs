//! Standard invariant checks.
//!
//! These capture the structural contracts a numerical engine relies on. They
//! verify WHAT must be true of every explored chain, not specific scenarios.

use std::collections::VecDeque;

use super::{Invariant, InvariantResult, SpaceSnapshot, Violation};

/// Tolerance when comparing probability sums against 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-12;

/// Every state must have at least one outgoing transition.
///
/// A deadlocked state has no successor distribution at all, which a solver
/// cannot represent.
pub struct DeadlockFree;

impl Invariant for DeadlockFree {
    fn name(&self) -> &'static str {
        "deadlock_free"
    }

    fn check(&self, space: &SpaceSnapshot) -> InvariantResult {
        for state in &space.states {
            if state.transitions.is_empty() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("state {} has no transitions", state.index),
                });
            }
        }
        Ok(())
    }
}

/// Outgoing probabilities of every state must form a distribution.
///
/// Each probability lies in `[0, 1]` and they sum to 1.
pub struct StochasticRows;

impl Invariant for StochasticRows {
    fn name(&self) -> &'static str {
        "stochastic_rows"
    }

    fn check(&self, space: &SpaceSnapshot) -> InvariantResult {
        for state in &space.states {
            if let Some((target, p)) =
                state.transitions.iter().find(|(_, p)| !(0.0..=1.0).contains(p))
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "state {} -> {}: probability {} outside [0, 1]",
                        state.index, target, p
                    ),
                });
            }

            if state.transitions.is_empty() {
                continue; // Reported by DeadlockFree
            }

            let sum: f64 = state.transitions.iter().map(|(_, p)| p).sum();
            if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("state {}: probabilities sum to {}", state.index, sum),
                });
            }
        }
        Ok(())
    }
}

/// A self-loop must be the only transition and carry probability exactly 1.
///
/// Self-loops mark states where the chain has stopped. A transient state that
/// partially loops back would stall an engine that treats loops as absorption.
pub struct SelfLoopsAbsorb;

impl Invariant for SelfLoopsAbsorb {
    fn name(&self) -> &'static str {
        "self_loops_absorb"
    }

    fn check(&self, space: &SpaceSnapshot) -> InvariantResult {
        for state in space.states.iter().filter(|s| s.has_self_loop()) {
            match state.transitions.as_slice() {
                [(_, p)] if *p == 1.0 => {},
                [(_, p)] => {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("state {}: self-loop has probability {}", state.index, p),
                    });
                },
                edges => {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "state {}: self-loop alongside {} other transitions",
                            state.index,
                            edges.len() - 1
                        ),
                    });
                },
            }
        }
        Ok(())
    }
}

/// The chain must be a complete binary tree of the given depth.
///
/// The initial state is the root. Every other state has exactly one parent,
/// every interior state has exactly two children, and the `2^depth` leaves
/// all sit at distance `depth` from the root and only loop back to
/// themselves.
pub struct FiniteTree {
    /// Expected depth (participant count)
    pub depth: usize,
}

impl FiniteTree {
    fn violation(&self, message: String) -> Violation {
        Violation { invariant: self.name(), message }
    }
}

impl Invariant for FiniteTree {
    fn name(&self) -> &'static str {
        "finite_tree"
    }

    fn check(&self, space: &SpaceSnapshot) -> InvariantResult {
        let Some(expected_states) = u32::try_from(self.depth.saturating_add(1))
            .ok()
            .and_then(|d| 1usize.checked_shl(d))
            .filter(|total| *total > 0)
            .map(|total| total - 1)
        else {
            return Err(self.violation(format!("depth {} too large", self.depth)));
        };
        if space.len() != expected_states {
            return Err(self.violation(format!(
                "expected {expected_states} states for depth {}, found {}",
                self.depth,
                space.len()
            )));
        }

        if let Some((position, state)) =
            space.states.iter().enumerate().find(|(position, state)| state.index != *position)
        {
            return Err(self.violation(format!(
                "state at position {position} claims index {}",
                state.index
            )));
        }

        let mut parents = vec![0usize; space.len()];
        for state in &space.states {
            for target in state.successors() {
                match parents.get_mut(target) {
                    Some(count) => *count += 1,
                    None => {
                        return Err(self.violation(format!(
                            "state {} -> {}: target out of range",
                            state.index, target
                        )));
                    },
                }
            }
        }
        if let Some(root_parents) = parents.first().filter(|p| **p != 0) {
            return Err(self.violation(format!("initial state has {root_parents} parents")));
        }
        if let Some((index, count)) = parents.iter().enumerate().skip(1).find(|(_, c)| **c != 1) {
            return Err(self.violation(format!("state {index} has {count} parents")));
        }

        // Distances from the root along tree edges.
        let mut depth = vec![usize::MAX; space.len()];
        let mut queue = VecDeque::from([0]);
        depth[0] = 0;
        while let Some(index) = queue.pop_front() {
            for target in space.states[index].successors() {
                if depth[target] == usize::MAX {
                    depth[target] = depth[index] + 1;
                    queue.push_back(target);
                }
            }
        }

        for (state, &at) in space.states.iter().zip(&depth) {
            let children = state.successors().count();
            if state.is_absorbing() {
                if at != self.depth {
                    return Err(self.violation(format!(
                        "leaf {} at depth {at}, expected {}",
                        state.index, self.depth
                    )));
                }
            } else if children != 2 {
                return Err(self.violation(format!(
                    "interior state {} has {children} children",
                    state.index
                )));
            }
        }
        Ok(())
    }
}

/// A label may only hold in absorbing states.
///
/// Used for outcome labels such as `end`, which are only meaningful once
/// every participant has replied.
pub struct LabelsOnlyWhenAbsorbing {
    /// Label to check
    pub label: &'static str,
}

impl Invariant for LabelsOnlyWhenAbsorbing {
    fn name(&self) -> &'static str {
        "labels_only_when_absorbing"
    }

    fn check(&self, space: &SpaceSnapshot) -> InvariantResult {
        for state in &space.states {
            if state.labels.contains(&self.label) && !state.is_absorbing() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("label {} holds in transient state {}", self.label, state.index),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::StateSnapshot;

    /// Depth-1 tree: root with two absorbing leaves.
    fn small_tree() -> SpaceSnapshot {
        SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(1, 0.3).with_transition(2, 0.7),
            StateSnapshot::new(1).with_transition(1, 1.0),
            StateSnapshot::new(2).with_transition(2, 1.0).with_label("end"),
        ])
    }

    #[test]
    fn well_formed_tree_passes_everything() {
        let space = small_tree();
        assert!(DeadlockFree.check(&space).is_ok());
        assert!(StochasticRows.check(&space).is_ok());
        assert!(SelfLoopsAbsorb.check(&space).is_ok());
        assert!(FiniteTree { depth: 1 }.check(&space).is_ok());
        assert!(LabelsOnlyWhenAbsorbing { label: "end" }.check(&space).is_ok());
    }

    #[test]
    fn deadlock_detected() {
        let space = SpaceSnapshot::from_states(vec![StateSnapshot::new(0)]);
        assert!(DeadlockFree.check(&space).is_err());
    }

    #[test]
    fn row_sum_checked() {
        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(1, 0.5).with_transition(2, 0.4),
            StateSnapshot::new(1).with_transition(1, 1.0),
            StateSnapshot::new(2).with_transition(2, 1.0),
        ]);
        let violation = StochasticRows.check(&space).unwrap_err();
        assert_eq!(violation.invariant, "stochastic_rows");
    }

    #[test]
    fn negative_probability_checked() {
        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(0, -0.5).with_transition(0, 1.5),
        ]);
        assert!(StochasticRows.check(&space).is_err());
    }

    #[test]
    fn partial_self_loop_detected() {
        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(0, 0.5).with_transition(1, 0.5),
            StateSnapshot::new(1).with_transition(1, 1.0),
        ]);
        assert!(SelfLoopsAbsorb.check(&space).is_err());
    }

    #[test]
    fn wrong_depth_detected() {
        let space = small_tree();
        assert!(FiniteTree { depth: 0 }.check(&space).is_err());
        assert!(FiniteTree { depth: 2 }.check(&space).is_err());
    }

    #[test]
    fn shared_child_detected() {
        // Three states, but both root edges lead to the same leaf.
        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(1, 0.5).with_transition(1, 0.5),
            StateSnapshot::new(1).with_transition(1, 1.0),
            StateSnapshot::new(2).with_transition(2, 1.0),
        ]);
        assert!(FiniteTree { depth: 1 }.check(&space).is_err());
    }

    #[test]
    fn misnumbered_states_are_violations() {
        let space =
            SpaceSnapshot::from_states(vec![StateSnapshot::new(5).with_transition(5, 1.0)]);
        let violation = FiniteTree { depth: 0 }.check(&space).unwrap_err();
        assert_eq!(violation.invariant, "finite_tree");
        assert!(violation.message.contains("claims index 5"));

        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(1, 0.5).with_transition(7, 0.5),
            StateSnapshot::new(1).with_transition(1, 1.0),
            StateSnapshot::new(2).with_transition(2, 1.0),
        ]);
        assert!(FiniteTree { depth: 1 }.check(&space).is_err());
    }

    #[test]
    fn transient_label_detected() {
        let space = SpaceSnapshot::from_states(vec![
            StateSnapshot::new(0).with_transition(1, 1.0).with_label("end"),
            StateSnapshot::new(1).with_transition(1, 1.0),
        ]);
        assert!(LabelsOnlyWhenAbsorbing { label: "end" }.check(&space).is_err());
    }
}
