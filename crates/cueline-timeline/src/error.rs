//! Rejection reasons for cue mutations.

use thiserror::Error;

use crate::cue::CueId;

/// Why a mutation was refused. A refused mutation leaves the model untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("time lies before zero")]
    NegativeTime,

    #[error("start lies after end")]
    InvertedRange,

    #[error("another cue already starts at frame {0}")]
    Occupied(i64),

    #[error("cue id {0} is already registered")]
    DuplicateId(CueId),

    #[error("unknown cue id {0}")]
    UnknownId(CueId),

    #[error("cue id {0} has no entry in the store")]
    MissingCue(CueId),

    #[error("no cue covers frame {0}")]
    NothingToCut(i64),

    #[error("subtitle track is locked")]
    Locked,

    #[error("invalid size {0}")]
    InvalidSize(i64),
}

impl From<EditError> for cueline_core::CuelineError {
    fn from(e: EditError) -> Self {
        cueline_core::CuelineError::InvalidParameter(e.to_string())
    }
}
