//! Acceptance specification: the set of fully-resolved outcomes that count
//! as consensus.
//!
//! A specification is a disjunction of patterns. An outcome is accepted when
//! it is exactly equal to one of them, element by element. A `0` in a pattern
//! therefore demands a refusal; it is not a "don't care". Patterns written as
//! CNF literals (`[1, 1, 0]` for "o1 and o2") only match outcomes where the
//! remaining participants refused.

use std::{borrow::Borrow, collections::BTreeSet, fmt, str::FromStr};

use crate::{error::ConfigError, state::Reply};

/// A fixed-length reply vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pattern(Vec<Reply>);

impl Pattern {
    /// Pattern from replies.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self(replies)
    }

    /// Pattern from raw bits. Every entry must be 0 or 1.
    pub fn from_bits(bits: &[u8]) -> Result<Self, ConfigError> {
        bits.iter()
            .enumerate()
            .map(|(position, &bit)| {
                Reply::from_value(i64::from(bit))
                    .ok_or(ConfigError::InvalidPatternEntry { position, found: bit.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Entries in participant order.
    pub fn replies(&self) -> &[Reply] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty pattern (zero participants).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<[Reply]> for Pattern {
    fn borrow(&self) -> &[Reply] {
        &self.0
    }
}

/// Parses `"101"` or `"1,0,1"`. The empty string is the empty pattern.
impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let entries: Vec<&str> = if s.is_empty() {
            Vec::new()
        } else if s.contains(',') {
            s.split(',').map(str::trim).collect()
        } else {
            s.char_indices().map(|(i, c)| &s[i..i + c.len_utf8()]).collect()
        };

        entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| match entry {
                "0" => Ok(Reply::Refuse),
                "1" => Ok(Reply::Confirm),
                other => {
                    Err(ConfigError::InvalidPatternEntry { position, found: other.to_string() })
                },
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|reply| write!(f, "{reply}"))
    }
}

/// Immutable set of acceptance patterns, all of length `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceSpec {
    participants: usize,
    patterns: BTreeSet<Pattern>,
}

impl AcceptanceSpec {
    /// Validate and build a specification for `participants` participants.
    ///
    /// Duplicate patterns collapse. An empty pattern set is valid and accepts
    /// nothing.
    pub fn new(
        participants: usize,
        patterns: impl IntoIterator<Item = Pattern>,
    ) -> Result<Self, ConfigError> {
        let mut set = BTreeSet::new();
        for (index, pattern) in patterns.into_iter().enumerate() {
            if pattern.len() != participants {
                return Err(ConfigError::PatternLength {
                    index,
                    expected: participants,
                    actual: pattern.len(),
                });
            }
            set.insert(pattern);
        }
        Ok(Self { participants, patterns: set })
    }

    /// Participant count every pattern is sized for.
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// True if `outcome` exactly equals some pattern.
    pub fn accepts(&self, outcome: &[Reply]) -> bool {
        self.patterns.contains(outcome)
    }

    /// Patterns in ascending order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no pattern is registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
