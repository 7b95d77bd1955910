//! Cueline Core - Foundation types for subtitle editing
//!
//! This crate provides the fundamental types used throughout Cueline:
//! - Time representation (RationalTime, FrameRate, TimeRange)
//! - Error types shared by the document layers
//! - Subtitle settings

pub mod config;
pub mod error;
pub mod time;

pub use config::{FrameSize, SubtitleSettings};
pub use error::{CuelineError, Result};
pub use time::{FrameRate, RationalTime, TimeRange};
