//! Consensus chain generator.
//!
//! Participants reply one at a time in index order. From a state at step
//! `k < n` the chain moves to step `k + 1` with reply `k` set to refuse
//! (offset 0, probability `1 - p[k]`) or confirm (offset 1, probability
//! `p[k]`). Resolved states (`k == n`) are absorbing with a single self-loop
//! of probability 1.
//!
//! ```text
//!                 (0,[_,_])
//!          1-p0 /          \ p0
//!       (1,[0,_])          (1,[1,_])
//!   1-p1 /     \ p1     1-p1 /    \ p1
//! (2,[0,0]) (2,[0,1]) (2,[1,0]) (2,[1,1])   <- absorbing, self-loop 1.0
//! ```
//!
//! The reachable graph is a complete binary tree of depth `n` with `2^n`
//! absorbing leaves.

use crate::{
    acceptance::AcceptanceSpec,
    error::{ConfigError, PreconditionError},
    model::{Focused, ModelGenerator, ModelInfo, ModelKind, VarDecl, VarType},
    registry::ParticipantRegistry,
    state::{ProcessState, Reply},
};

/// Label true on resolved states whose outcome is accepted.
pub const END_LABEL: &str = "end";

/// Name of the step-counter variable.
pub const STEP_VAR: &str = "x";

/// Prefix of reply variable names (`o0`, `o1`, ...).
pub const REPLY_VAR_PREFIX: &str = "o";

const LABELS: [&str; 1] = [END_LABEL];

/// Only choice of a chain.
const CHOICES: usize = 1;

/// Reply recorded by the transition at `offset`.
fn reply_at(offset: usize) -> Reply {
    if offset == 0 { Reply::Refuse } else { Reply::Confirm }
}

/// Generator for the consensus chain.
///
/// Holds only read-only configuration; any number of [`ConsensusFocus`]
/// contexts may borrow it at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusModel {
    registry: ParticipantRegistry,
    spec: AcceptanceSpec,
}

impl ConsensusModel {
    /// Build a generator from a registry and a specification sized for the
    /// same participant count.
    pub fn new(registry: ParticipantRegistry, spec: AcceptanceSpec) -> Result<Self, ConfigError> {
        if registry.len() != spec.participants() {
            return Err(ConfigError::ParticipantMismatch {
                registry: registry.len(),
                spec: spec.participants(),
            });
        }

        tracing::debug!(
            participants = registry.len(),
            patterns = spec.len(),
            "consensus model built"
        );

        Ok(Self { registry, spec })
    }

    /// Participant count `n`.
    pub fn participants(&self) -> usize {
        self.registry.len()
    }

    /// Confirmation probabilities.
    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Acceptance specification.
    pub fn spec(&self) -> &AcceptanceSpec {
        &self.spec
    }

    fn validate(&self, state: &ProcessState) -> Result<(), PreconditionError> {
        let participants = self.participants();
        if state.participants() != participants {
            return Err(PreconditionError::StateArity {
                expected: participants + 1,
                actual: state.participants() + 1,
            });
        }
        if state.step() > participants {
            return Err(PreconditionError::StepOutOfBounds {
                step: state.step() as i64,
                participants,
            });
        }
        Ok(())
    }
}

impl ModelInfo for ConsensusModel {
    fn model_kind(&self) -> ModelKind {
        ModelKind::Dtmc
    }

    fn var_decls(&self) -> Vec<VarDecl> {
        let step = VarDecl::new(
            STEP_VAR,
            VarType::BoundedInt { low: 0, high: self.participants() as i64 },
        );
        std::iter::once(step)
            .chain(
                (0..self.participants())
                    .map(|i| VarDecl::new(format!("{REPLY_VAR_PREFIX}{i}"), VarType::Binary)),
            )
            .collect()
    }

    fn label_names(&self) -> &[&'static str] {
        &LABELS
    }
}

impl ModelGenerator for ConsensusModel {
    type State = ProcessState;
    type Focus<'a> = ConsensusFocus<'a>;

    fn initial_state(&self) -> ProcessState {
        ProcessState::initial(self.participants())
    }

    fn focus<'a>(&'a self, state: &ProcessState) -> Result<ConsensusFocus<'a>, PreconditionError> {
        self.validate(state)?;
        tracing::trace!(%state, "focus");

        // `None` once resolved: the state is absorbing.
        let pending = if state.is_resolved() {
            None
        } else {
            self.registry.confirm_probability(state.step())
        };

        Ok(ConsensusFocus { model: self, state: state.clone(), pending })
    }

    fn state_values(&self, state: &ProcessState) -> Vec<i64> {
        state.to_vars()
    }
}

/// Query context for one focused [`ProcessState`].
#[derive(Debug, Clone)]
pub struct ConsensusFocus<'a> {
    model: &'a ConsensusModel,
    state: ProcessState,
    /// Confirmation probability of the participant about to reply.
    pending: Option<f64>,
}

impl ConsensusFocus<'_> {
    /// True if the focused state is absorbing.
    pub fn is_absorbing(&self) -> bool {
        self.pending.is_none()
    }

    fn transitions(&self) -> usize {
        if self.is_absorbing() { 1 } else { Reply::ALL.len() }
    }

    fn check_choice(&self, choice: usize) -> Result<(), PreconditionError> {
        if choice >= CHOICES {
            return Err(PreconditionError::ChoiceOutOfRange { choice, available: CHOICES });
        }
        Ok(())
    }

    fn check_transition(&self, choice: usize, offset: usize) -> Result<(), PreconditionError> {
        self.check_choice(choice)?;
        let available = self.transitions();
        if offset >= available {
            return Err(PreconditionError::OffsetOutOfRange { offset, available });
        }
        Ok(())
    }
}

impl Focused for ConsensusFocus<'_> {
    type State = ProcessState;

    fn state(&self) -> &ProcessState {
        &self.state
    }

    fn num_choices(&self) -> usize {
        CHOICES
    }

    fn num_transitions(&self, choice: usize) -> Result<usize, PreconditionError> {
        self.check_choice(choice)?;
        Ok(self.transitions())
    }

    fn transition_action(
        &self,
        choice: usize,
        offset: usize,
    ) -> Result<Option<&'static str>, PreconditionError> {
        self.check_transition(choice, offset)?;
        Ok(None)
    }

    fn transition_probability(
        &self,
        choice: usize,
        offset: usize,
    ) -> Result<f64, PreconditionError> {
        self.check_transition(choice, offset)?;
        Ok(match (self.pending, reply_at(offset)) {
            (None, _) => 1.0,
            (Some(p), Reply::Refuse) => 1.0 - p,
            (Some(p), Reply::Confirm) => p,
        })
    }

    fn transition_target(
        &self,
        choice: usize,
        offset: usize,
    ) -> Result<ProcessState, PreconditionError> {
        self.check_transition(choice, offset)?;
        // Absorbing states loop back to an equal copy of themselves.
        Ok(self.state.advance(reply_at(offset)).unwrap_or_else(|| self.state.clone()))
    }

    fn is_label_true(&self, label: usize) -> Result<bool, PreconditionError> {
        if label >= LABELS.len() {
            return Err(PreconditionError::LabelOutOfRange { index: label, available: LABELS.len() });
        }
        Ok(self.state.is_resolved() && self.model.spec.accepts(self.state.replies()))
    }
}
