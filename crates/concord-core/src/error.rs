//! Error types for the consensus model generator.
//!
//! Two layers: configuration errors raised while building a generator, and
//! precondition errors raised when the exploring engine steps outside the
//! focus/query protocol. Neither is transient. Both indicate a bug in the
//! caller or its setup, so the engine must stop exploring rather than retry.

use thiserror::Error;

/// Errors raised while constructing a generator.
///
/// Construction is all-or-nothing: if any of these is returned, no generator
/// exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Probability sequence length differs from the participant count
    #[error("expected {expected} probabilities, got {actual}")]
    ProbabilityCount {
        /// Declared participant count
        expected: usize,
        /// Number of probabilities supplied
        actual: usize,
    },

    /// A confirmation probability lies outside `[0, 1]` (or is NaN)
    #[error("probability {value} for participant {participant} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Participant index
        participant: usize,
        /// Offending value
        value: f64,
    },

    /// An acceptance pattern has the wrong number of entries
    #[error("pattern {index} has {actual} entries, expected {expected}")]
    PatternLength {
        /// Position of the pattern in the supplied list
        index: usize,
        /// Declared participant count
        expected: usize,
        /// Entries in the pattern
        actual: usize,
    },

    /// A pattern entry is not a reply value (0 or 1)
    #[error("invalid pattern entry {found:?} at position {position}")]
    InvalidPatternEntry {
        /// Position inside the pattern
        position: usize,
        /// Text of the rejected entry
        found: String,
    },

    /// Registry and acceptance specification disagree on participant count
    #[error("registry has {registry} participants, acceptance specification has {spec}")]
    ParticipantMismatch {
        /// Participants in the registry
        registry: usize,
        /// Participants the specification was built for
        spec: usize,
    },
}

/// Errors raised when a query violates the focus protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// Encoded state has the wrong number of variables
    #[error("state has {actual} variables, model declares {expected}")]
    StateArity {
        /// Variables declared by the model
        expected: usize,
        /// Variables in the offending state
        actual: usize,
    },

    /// Step counter outside `[0, n]`
    #[error("step {step} outside [0, {participants}]")]
    StepOutOfBounds {
        /// Offending step value
        step: i64,
        /// Participant count `n`
        participants: usize,
    },

    /// Reply variable outside `{0, 1}`
    #[error("reply variable {index} has value {value}, expected 0 or 1")]
    ReplyOutOfBounds {
        /// Participant index of the reply
        index: usize,
        /// Offending value
        value: i64,
    },

    /// Choice index not offered by the focused state
    #[error("choice {choice} out of range ({available} available)")]
    ChoiceOutOfRange {
        /// Requested choice
        choice: usize,
        /// Number of choices at the focused state
        available: usize,
    },

    /// Transition offset not offered by the focused state
    #[error("transition offset {offset} out of range ({available} available)")]
    OffsetOutOfRange {
        /// Requested offset
        offset: usize,
        /// Number of transitions for the choice
        available: usize,
    },

    /// Label index not declared by the model
    #[error("label {index} out of range ({available} labels)")]
    LabelOutOfRange {
        /// Requested label index
        index: usize,
        /// Number of declared labels
        available: usize,
    },

    /// Reward structure index not declared by the model
    #[error("reward structure {index} out of range ({available} structures)")]
    RewardStructOutOfRange {
        /// Requested reward structure index
        index: usize,
        /// Number of declared reward structures
        available: usize,
    },
}

impl PreconditionError {
    /// Returns true if the error was caused by a malformed state passed to
    /// `focus`, as opposed to an out-of-range query on a valid focus.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::StateArity { .. } | Self::StepOutOfBounds { .. } | Self::ReplyOutOfBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_are_classified() {
        assert!(PreconditionError::StateArity { expected: 3, actual: 2 }.is_invalid_state());
        assert!(PreconditionError::StepOutOfBounds { step: -1, participants: 2 }.is_invalid_state());
        assert!(PreconditionError::ReplyOutOfBounds { index: 0, value: 2 }.is_invalid_state());
    }

    #[test]
    fn query_errors_are_not_state_errors() {
        assert!(!PreconditionError::ChoiceOutOfRange { choice: 1, available: 1 }.is_invalid_state());
        assert!(!PreconditionError::OffsetOutOfRange { offset: 2, available: 2 }.is_invalid_state());
        assert!(!PreconditionError::LabelOutOfRange { index: 1, available: 1 }.is_invalid_state());
        assert!(
            !PreconditionError::RewardStructOutOfRange { index: 1, available: 1 }
                .is_invalid_state()
        );
    }

    #[test]
    fn config_errors_render_context() {
        let err = ConfigError::ProbabilityOutOfRange { participant: 1, value: 1.5 };
        assert_eq!(err.to_string(), "probability 1.5 for participant 1 is outside [0, 1]");

        let err = ConfigError::PatternLength { index: 0, expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "pattern 0 has 2 entries, expected 3");
    }
}
