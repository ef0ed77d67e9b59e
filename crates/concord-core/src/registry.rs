//! Participant registry: per-participant confirmation probabilities.

use crate::error::ConfigError;

/// Confirmation probability for each participant, index-aligned with reply
/// positions.
///
/// Immutable once built. Every probability lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRegistry {
    probabilities: Vec<f64>,
}

impl ParticipantRegistry {
    /// Validate and build a registry for `participants` participants.
    pub fn new(participants: usize, probabilities: Vec<f64>) -> Result<Self, ConfigError> {
        if probabilities.len() != participants {
            return Err(ConfigError::ProbabilityCount {
                expected: participants,
                actual: probabilities.len(),
            });
        }

        if let Some((participant, &value)) =
            probabilities.iter().enumerate().find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(ConfigError::ProbabilityOutOfRange { participant, value });
        }

        Ok(Self { probabilities })
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True if there are no participants.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability that `participant` confirms. `None` if out of range.
    pub fn confirm_probability(&self, participant: usize) -> Option<f64> {
        self.probabilities.get(participant).copied()
    }

    /// All probabilities in participant order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}
