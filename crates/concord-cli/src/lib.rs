//! Command-line front end for Concord.
//!
//! Turns parsed arguments into a [`RunConfig`] and drives the reference
//! engine over the resulting generator: exploration, invariant checks, the
//! `end` reachability probability and the expected number of steps to
//! absorption. A seeded simulation and a DOT export are optional.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{fmt, path::PathBuf};

use concord_core::{ConfigError, END_LABEL, ModelConfig, ModelInfo, Pattern, Reply, STEP_REWARD};
use concord_harness::{
    ExploreConfig, ExploreError, InvariantRegistry, PathSampler, SampleEstimate, SolveError,
    SolverConfig, SpaceSnapshot, Violation, explore, expected_reward_to_absorption,
    label_probability, to_dot,
};
use thiserror::Error;

/// Errors reported by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    /// A probability argument is not a number
    #[error("invalid probability {value:?}")]
    InvalidProbability {
        /// Offending argument fragment
        value: String,
    },

    /// Model configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Exploration failed
    #[error("exploration error: {0}")]
    Explore(#[from] ExploreError),

    /// Numerical analysis failed
    #[error("solver error: {0}")]
    Solve(#[from] SolveError),

    /// Explored chain is malformed
    #[error("{} invariant violation(s): {}", .0.len(), join_violations(.0))]
    Invariants(Vec<Violation>),

    /// Writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_violations(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Parse a comma-separated list of confirmation probabilities.
///
/// Range checking is left to model construction.
pub fn parse_probabilities(list: &str) -> Result<Vec<f64>, CliError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| CliError::InvalidProbability { value: value.to_string() })
        })
        .collect()
}

/// Parse acceptance patterns, defaulting to unanimous confirmation.
pub fn parse_patterns(patterns: &[String], participants: usize) -> Result<Vec<Pattern>, CliError> {
    if patterns.is_empty() {
        return Ok(vec![Pattern::new(vec![Reply::Confirm; participants])]);
    }
    patterns.iter().map(|p| p.parse::<Pattern>().map_err(CliError::from)).collect()
}

/// Everything a single invocation needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Generator parameters
    pub model: ModelConfig,
    /// Exploration bounds
    pub explore: ExploreConfig,
    /// Solver tolerances
    pub solver: SolverConfig,
    /// Write the explored chain here as DOT
    pub dot: Option<PathBuf>,
    /// Number of simulated paths (0 disables simulation)
    pub samples: usize,
    /// Simulation seed
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            explore: ExploreConfig::default(),
            solver: SolverConfig::default(),
            dot: None,
            samples: 0,
            seed: 0,
        }
    }
}

/// Results of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Model type
    pub kind: String,
    /// Participant count
    pub participants: usize,
    /// Accepted outcomes in pattern order
    pub accepted: Vec<String>,
    /// Reachable states
    pub states: usize,
    /// Explored transitions
    pub transitions: usize,
    /// Absorbing states
    pub absorbing: usize,
    /// Invariants checked
    pub invariants: usize,
    /// `P=? [F "end"]`
    pub end_probability: f64,
    /// `R{"r"}=? [F absorbing]`
    pub expected_steps: f64,
    /// Simulation result, if requested
    pub estimate: Option<(u64, SampleEstimate)>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model: {} with {} participants", self.kind, self.participants)?;
        if self.accepted.is_empty() {
            writeln!(f, "accepted outcomes: none")?;
        } else {
            writeln!(f, "accepted outcomes: {}", self.accepted.join(", "))?;
        }
        writeln!(
            f,
            "states: {} ({} absorbing), transitions: {}",
            self.states, self.absorbing, self.transitions
        )?;
        writeln!(f, "invariants: {} checked", self.invariants)?;
        writeln!(f, "P=? [F \"{END_LABEL}\"] = {}", self.end_probability)?;
        writeln!(f, "R{{\"{STEP_REWARD}\"}}=? [F absorbing] = {}", self.expected_steps)?;
        if let Some((seed, estimate)) = &self.estimate {
            writeln!(
                f,
                "simulation: {} paths (seed {seed}), P ~ {}, mean steps {}",
                estimate.samples,
                estimate.probability(),
                estimate.mean_steps
            )?;
        }
        Ok(())
    }
}

/// Build the generator, explore it, check it and analyse it.
pub fn analyze(config: &RunConfig) -> Result<Report, CliError> {
    let model = config.model.build()?;
    tracing::info!(participants = model.participants(), "model built");

    let space = explore(&model, &config.explore)?;
    tracing::info!(states = space.len(), transitions = space.num_transitions(), "explored");

    let registry = InvariantRegistry::for_consensus(model.participants());
    registry.check_all(&SpaceSnapshot::from_space(&space)).map_err(CliError::Invariants)?;

    if let Some(path) = &config.dot {
        std::fs::write(path, to_dot(&space))?;
        tracing::info!(path = %path.display(), "wrote DOT");
    }

    let end_probability = label_probability(&space, END_LABEL, &config.solver)?;
    let expected_steps =
        expected_reward_to_absorption(&model, &space, STEP_REWARD, &config.solver)?;

    let estimate = if config.samples == 0 {
        None
    } else {
        let label = model
            .label_index(END_LABEL)
            .ok_or_else(|| SolveError::UnknownLabel(END_LABEL.to_string()))?;
        let mut sampler = PathSampler::with_seed(config.seed);
        Some((config.seed, sampler.estimate(&model, label, config.samples)?))
    };

    Ok(Report {
        kind: model.model_kind().to_string(),
        participants: model.participants(),
        accepted: model
            .spec()
            .patterns()
            .map(|p| if p.is_empty() { "<empty>".to_string() } else { p.to_string() })
            .collect(),
        states: space.len(),
        transitions: space.num_transitions(),
        absorbing: space.absorbing().iter().filter(|a| **a).count(),
        invariants: registry.len(),
        end_probability,
        expected_steps,
        estimate,
    })
}
