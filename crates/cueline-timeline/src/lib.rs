//! Cueline Timeline - subtitle track model
//!
//! Implements the subtitle track of a video timeline:
//! - Cue store keyed by start time with an ID registry
//! - Reversible edit commands with undo/redo
//! - Snap point propagation to weakly held listeners
//! - Structured (JSON) form and document write-back

pub mod cue;
pub mod document;
pub mod edit;
pub mod error;
pub mod ids;
pub mod model;
pub mod notify;
pub mod serialization;
pub mod snap;

pub use cue::{Cue, CueId};
pub use edit::{labels, SubtitleCommand, UndoStack};
pub use error::EditError;
pub use ids::{IdAllocator, SequentialIds};
pub use model::{SharedSubtitleModel, SubtitleModel};
pub use notify::{CueField, FieldList, FieldValue, ModelEvent};
pub use serialization::{records_from_json, CueRecord};
pub use snap::{SnapListener, SnapRegistry, SnapSubscription};
