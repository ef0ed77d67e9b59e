//! Process state: a step counter plus one reply slot per participant.
//!
//! States are immutable values. Advancing the process produces a new state;
//! nothing mutates a state once it has been handed to the engine.
//!
//! Reply positions at or after `step` are placeholders. They carry no meaning
//! and are normalised to [`Reply::Refuse`] (encoded as 0) on construction, so
//! derived equality and hashing only ever distinguish meaningful positions.

use std::fmt;

use crate::error::PreconditionError;

/// A participant's reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reply {
    /// Participant refused (encoded as 0). Also the placeholder value.
    #[default]
    Refuse,
    /// Participant confirmed (encoded as 1)
    Confirm,
}

impl Reply {
    /// Replies in transition order: offset 0 refuses, offset 1 confirms.
    pub const ALL: [Reply; 2] = [Reply::Refuse, Reply::Confirm];

    /// Decode a raw variable value. Only 0 and 1 are replies.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Refuse),
            1 => Some(Self::Confirm),
            _ => None,
        }
    }

    /// Raw variable value of this reply.
    pub fn value(self) -> u8 {
        match self {
            Self::Refuse => 0,
            Self::Confirm => 1,
        }
    }
}

impl From<bool> for Reply {
    fn from(confirmed: bool) -> Self {
        if confirmed { Self::Confirm } else { Self::Refuse }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A state of the consensus process.
///
/// `replies[i]` is meaningful only for `i < step`. A state is resolved once
/// `step == n`, at which point every participant has replied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessState {
    step: usize,
    replies: Vec<Reply>,
}

impl ProcessState {
    /// Initial state for `participants` participants: nobody has replied yet.
    pub fn initial(participants: usize) -> Self {
        Self { step: 0, replies: vec![Reply::Refuse; participants] }
    }

    /// Build a state from raw parts.
    ///
    /// No bounds are checked here; a state whose `step` exceeds the number of
    /// reply slots is rejected later, when it is focused. Placeholder
    /// positions are normalised.
    pub fn new(step: usize, mut replies: Vec<Reply>) -> Self {
        for reply in replies.iter_mut().skip(step) {
            *reply = Reply::Refuse;
        }
        Self { step, replies }
    }

    /// Decode the engine's variable vector `[step, reply_0, .., reply_{n-1}]`.
    pub fn from_vars(vars: &[i64], participants: usize) -> Result<Self, PreconditionError> {
        let expected = participants + 1;
        let Some((&step, raw_replies)) = vars.split_first() else {
            return Err(PreconditionError::StateArity { expected, actual: 0 });
        };
        if vars.len() != expected {
            return Err(PreconditionError::StateArity { expected, actual: vars.len() });
        }

        let step = usize::try_from(step)
            .ok()
            .filter(|s| *s <= participants)
            .ok_or(PreconditionError::StepOutOfBounds { step, participants })?;

        let replies = raw_replies
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                Reply::from_value(value).ok_or(PreconditionError::ReplyOutOfBounds { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(step, replies))
    }

    /// Encode as the engine's variable vector.
    pub fn to_vars(&self) -> Vec<i64> {
        std::iter::once(self.step as i64)
            .chain(self.replies.iter().map(|r| i64::from(r.value())))
            .collect()
    }

    /// Number of participants that have replied.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Full reply vector, placeholders included.
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    /// Replies collected so far (`replies[..step]`).
    pub fn resolved_replies(&self) -> &[Reply] {
        &self.replies[..self.step.min(self.replies.len())]
    }

    /// Number of reply slots.
    pub fn participants(&self) -> usize {
        self.replies.len()
    }

    /// True once every participant has replied.
    pub fn is_resolved(&self) -> bool {
        self.step == self.replies.len()
    }

    /// Successor state recording `reply` for the participant at `step`.
    ///
    /// Returns `None` if the state is already resolved.
    pub fn advance(&self, reply: Reply) -> Option<Self> {
        if self.step >= self.replies.len() {
            return None;
        }
        let mut replies = self.replies.clone();
        replies[self.step] = reply;
        Some(Self { step: self.step + 1, replies })
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(step={}, replies=[", self.step)?;
        for (i, reply) in self.replies.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if i < self.step { write!(f, "{reply}")? } else { write!(f, "_")? }
        }
        write!(f, "])")
    }
}
