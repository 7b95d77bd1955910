//! Cue types for the subtitle track.

use std::fmt;

use cueline_core::RationalTime;
use serde::{Deserialize, Serialize};

/// Opaque identifier handed to the view and external callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CueId(pub u64);

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub start: RationalTime,
    pub end: RationalTime,
    /// May contain `\n` line breaks.
    pub text: String,
}

impl Cue {
    pub fn new(start: RationalTime, end: RationalTime, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Store value: everything about a cue except its start key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CueEntry {
    pub id: CueId,
    pub end: RationalTime,
    pub text: String,
}

impl CueEntry {
    pub fn to_cue(&self, start: RationalTime) -> Cue {
        Cue::new(start, self.end, self.text.clone())
    }
}
