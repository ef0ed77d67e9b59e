//! On-the-fly probabilistic model of a multi-party consensus round.
//!
//! `n` participants reply confirm or refuse, one at a time in a fixed order,
//! each confirming with its own fixed probability. Once every reply is in, the
//! outcome is checked against an acceptance specification.
//!
//! This crate is the generator an external checking engine queries while it
//! explores the chain. It performs no I/O, never initiates work, and holds no
//! mutable state: configuration is read-only and every query is answered from
//! an explicit focus context.
//!
//! # Components
//!
//! - [`ParticipantRegistry`]: confirmation probability per participant
//! - [`AcceptanceSpec`]: accepted outcomes, matched by exact equality
//! - [`ProcessState`]: step counter plus reply vector
//! - [`ConsensusModel`]: transitions, the `end` label and the `r` reward
//! - [`ModelConfig`]: validated construction parameters
//!
//! # Example
//!
//! ```
//! use concord_core::{Focused, ModelConfig, ModelGenerator};
//!
//! let model = ModelConfig::default().build()?;
//! let focus = model.focus(&model.initial_state())?;
//! assert_eq!(focus.num_transitions(0)?, 2);
//! assert_eq!(focus.transition_probability(0, 1)?, 0.5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod acceptance;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod registry;
pub mod reward;
pub mod state;

pub use acceptance::{AcceptanceSpec, Pattern};
pub use config::ModelConfig;
pub use error::{ConfigError, PreconditionError};
pub use generator::{ConsensusFocus, ConsensusModel, END_LABEL, REPLY_VAR_PREFIX, STEP_VAR};
pub use model::{Focused, ModelGenerator, ModelInfo, ModelKind, RewardSource, VarDecl, VarType};
pub use registry::ParticipantRegistry;
pub use reward::{STATE_REWARD, STEP_REWARD};
pub use state::{ProcessState, Reply};
