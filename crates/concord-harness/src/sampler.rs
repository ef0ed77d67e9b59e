//! Seeded path simulation.
//!
//! Walks the chain through the focus protocol, choosing each transition by
//! its probability, until an absorbing state is reached. Given the same seed
//! the sampler produces the same paths, so estimates are reproducible.

use concord_core::{Focused, ModelGenerator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::explorer::ExploreError;

/// Default bound on path length.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 10_000;

/// One simulated path.
#[derive(Debug, Clone)]
pub struct SampledPath<S> {
    /// Visited states, starting with the initial state
    pub states: Vec<S>,
    /// True if the path ended in an absorbing state
    pub absorbed: bool,
    /// True if some visited state satisfied the sampled label
    pub hit: bool,
}

impl<S> SampledPath<S> {
    /// Number of transitions taken before absorption (self-loops excluded).
    pub fn steps(&self) -> usize {
        self.states.len().saturating_sub(1)
    }
}

/// Monte Carlo estimate of a reachability probability.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleEstimate {
    /// Paths simulated
    pub samples: usize,
    /// Paths that reached a labelled state
    pub hits: usize,
    /// Paths cut off by the length bound
    pub truncated: usize,
    /// Mean number of steps per path
    pub mean_steps: f64,
}

impl SampleEstimate {
    /// Fraction of paths that reached a labelled state.
    pub fn probability(&self) -> f64 {
        if self.samples == 0 { 0.0 } else { self.hits as f64 / self.samples as f64 }
    }
}

/// Deterministic path sampler.
#[derive(Debug, Clone)]
pub struct PathSampler {
    rng: ChaCha8Rng,
    max_path_length: usize,
}

impl PathSampler {
    /// Sampler seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), max_path_length: DEFAULT_MAX_PATH_LENGTH }
    }

    /// Bound the number of steps per path.
    pub fn with_max_path_length(mut self, max_path_length: usize) -> Self {
        self.max_path_length = max_path_length;
        self
    }

    /// Simulate a single path, tracking label `label`.
    pub fn sample_path<G: ModelGenerator>(
        &mut self,
        generator: &G,
        label: usize,
    ) -> Result<SampledPath<G::State>, ExploreError> {
        let mut state = generator.initial_state();
        let mut path = SampledPath { states: vec![state.clone()], absorbed: false, hit: false };

        for _ in 0..=self.max_path_length {
            let focus = generator.focus(&state)?;
            path.hit |= focus.is_label_true(label)?;

            let choices = focus.num_choices();
            if choices != 1 {
                return Err(ExploreError::Nondeterministic { state: state.to_string(), choices });
            }

            let count = focus.num_transitions(0)?;
            let draw: f64 = self.rng.gen_range(0.0..1.0);
            let mut cumulative = 0.0;
            let mut chosen = count.saturating_sub(1);
            for offset in 0..count {
                cumulative += focus.transition_probability(0, offset)?;
                if draw < cumulative {
                    chosen = offset;
                    break;
                }
            }

            let next = focus.transition_target(0, chosen)?;
            if next == state {
                path.absorbed = true;
                break;
            }
            if path.steps() == self.max_path_length {
                break;
            }
            path.states.push(next.clone());
            state = next;
        }

        Ok(path)
    }

    /// Simulate `samples` paths and estimate the probability of reaching
    /// label `label`.
    pub fn estimate<G: ModelGenerator>(
        &mut self,
        generator: &G,
        label: usize,
        samples: usize,
    ) -> Result<SampleEstimate, ExploreError> {
        let mut hits = 0;
        let mut truncated = 0;
        let mut total_steps = 0;

        for _ in 0..samples {
            let path = self.sample_path(generator, label)?;
            hits += usize::from(path.hit);
            truncated += usize::from(!path.absorbed);
            total_steps += path.steps();
        }

        let mean_steps = if samples == 0 { 0.0 } else { total_steps as f64 / samples as f64 };
        tracing::debug!(samples, hits, truncated, mean_steps, "sampling complete");

        Ok(SampleEstimate { samples, hits, truncated, mean_steps })
    }
}
