//! Row-based change notifications for the presentation layer.

use std::path::PathBuf;

use smallvec::SmallVec;

use crate::cue::CueId;

/// Field of a row, as read by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueField {
    Text,
    Id,
    /// Start in seconds.
    StartPos,
    /// End in seconds.
    EndPos,
    StartFrame,
    EndFrame,
    Selected,
    Grabbed,
}

/// Value of a [`CueField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Id(CueId),
    Seconds(f64),
    Frame(i64),
    Flag(bool),
}

pub type FieldList = SmallVec<[CueField; 2]>;

/// Something the view or the host application should react to.
///
/// Events queue up on the model in emission order; drain them with
/// [`SubtitleModel::take_events`](crate::SubtitleModel::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    RowInserted { row: usize },
    RowRemoved { row: usize },
    DataChanged { row: usize, fields: FieldList },
    /// The document file is stale and should be written back.
    ModelChanged,
    /// Frames `[start, end)` of the project need re-rendering.
    RefreshRange { start: i64, end: i64 },
    /// The rendering filter now reads this file.
    FilterAttached { path: PathBuf },
    FilterDetached,
}

impl ModelEvent {
    pub(crate) fn changed(row: usize, fields: &[CueField]) -> Self {
        Self::DataChanged {
            row,
            fields: fields.iter().copied().collect(),
        }
    }

    /// Refresh covering two frame positions in either order.
    pub(crate) fn refresh_between(a: i64, b: i64) -> Self {
        Self::RefreshRange {
            start: a.min(b),
            end: a.max(b),
        }
    }
}
