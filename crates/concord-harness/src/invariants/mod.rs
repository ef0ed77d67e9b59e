//! Structural invariant checking for explored state spaces.
//!
//! A numerical engine assumes the chain it solves is well formed: every row
//! is a probability distribution, self-loops only occur where the chain has
//! stopped, and so on. These invariants check those assumptions against an
//! explored [`StateSpace`] instead of trusting the generator.
//!
//! # Usage
//!
//! ```ignore
//! let space = explore(&model, &ExploreConfig::default())?;
//! let registry = InvariantRegistry::for_consensus(model.participants());
//! registry.check_all(&SpaceSnapshot::from_space(&space))?;
//! ```

mod checks;
mod snapshot;

pub use checks::{DeadlockFree, FiniteTree, LabelsOnlyWhenAbsorbing, SelfLoopsAbsorb, StochasticRows};
pub use snapshot::{SpaceSnapshot, StateSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A structural property of an explored chain.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    fn check(&self, space: &SpaceSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Invariants every chain must satisfy.
    ///
    /// Includes:
    /// - [`DeadlockFree`]: every state has a transition
    /// - [`StochasticRows`]: outgoing probabilities form a distribution
    /// - [`SelfLoopsAbsorb`]: a self-loop is the only transition, with
    ///   probability 1
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(DeadlockFree);
        registry.add(StochasticRows);
        registry.add(SelfLoopsAbsorb);
        registry
    }

    /// Standard invariants plus the shape of an `n`-participant round.
    ///
    /// Adds:
    /// - [`FiniteTree`]: binary tree of depth `n` with `2^n` leaves
    /// - [`LabelsOnlyWhenAbsorbing`]: `end` never holds mid-round
    pub fn for_consensus(participants: usize) -> Self {
        let mut registry = Self::standard();
        registry.add(FiniteTree { depth: participants });
        registry.add(LabelsOnlyWhenAbsorbing { label: concord_core::END_LABEL });
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given snapshot.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, space: &SpaceSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(space).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on the first violation.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, space: &SpaceSnapshot, context: &str) {
        if let Err(violations) = self.check_all(space) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 3);
        assert_eq!(InvariantRegistry::for_consensus(2).len(), 5);
    }

    #[test]
    fn empty_snapshot_is_not_a_round() {
        let space = SpaceSnapshot::empty();
        assert!(InvariantRegistry::standard().check_all(&space).is_ok());

        let violations = InvariantRegistry::for_consensus(0).check_all(&space).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, "finite_tree");
    }

    #[test]
    fn violations_render_name_and_message() {
        let violation = Violation { invariant: "stochastic_rows", message: "state 3".to_string() };
        assert_eq!(violation.to_string(), "stochastic_rows: state 3");
    }
}
