//! Generator configuration.

use crate::{
    acceptance::{AcceptanceSpec, Pattern},
    error::ConfigError,
    generator::ConsensusModel,
    registry::ParticipantRegistry,
    state::Reply,
};

/// Construction parameters for a [`ConsensusModel`].
///
/// The default describes two participants that each confirm with
/// probability 0.5, accepted only when both confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Participant count `n`
    pub participants: usize,
    /// Confirmation probability per participant (length `n`)
    pub probabilities: Vec<f64>,
    /// Accepted outcomes (each of length `n`)
    pub patterns: Vec<Pattern>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            participants: 2,
            probabilities: vec![0.5, 0.5],
            patterns: vec![Pattern::new(vec![Reply::Confirm, Reply::Confirm])],
        }
    }
}

impl ModelConfig {
    /// Configuration with `n` participants confirming with probability `p`
    /// each, accepted only on unanimous confirmation.
    pub fn unanimous(participants: usize, probability: f64) -> Self {
        Self {
            participants,
            probabilities: vec![probability; participants],
            patterns: vec![Pattern::new(vec![Reply::Confirm; participants])],
        }
    }

    /// Validate the configuration and build the generator.
    ///
    /// Nothing is built unless every check passes.
    pub fn build(&self) -> Result<ConsensusModel, ConfigError> {
        let registry = ParticipantRegistry::new(self.participants, self.probabilities.clone())?;
        let spec = AcceptanceSpec::new(self.participants, self.patterns.iter().cloned())?;
        ConsensusModel::new(registry, spec)
    }
}
