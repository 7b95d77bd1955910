//! Settings for the subtitle model and its document writer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CuelineError, Result};
use crate::time::FrameRate;

/// Output frame size, used to lay out the default ASS header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const HD: Self = Self {
        width: 1920,
        height: 1080,
    };
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::HD
    }
}

/// Top-level subtitle settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Rate used for every seconds <-> frames conversion.
    pub frame_rate: FrameRate,
    pub frame_size: FrameSize,
    /// Style referenced by written dialogue lines.
    pub style_name: String,
    /// Font used in the default style line.
    pub font_name: String,
    /// Where the document is written when no path was imported.
    pub document_path: Option<PathBuf>,
    /// Maximum undo history depth.
    pub undo_depth: usize,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::FPS_25,
            frame_size: FrameSize::HD,
            style_name: "Default".to_string(),
            font_name: "Consolas".to_string(),
            document_path: None,
            undo_depth: 200,
        }
    }
}

impl SubtitleSettings {
    /// Font size of the default style: one fifteenth of the frame height.
    pub fn font_size(&self) -> u32 {
        self.frame_size.height / 15
    }

    /// Vertical margin of the default style.
    pub fn vertical_margin(&self) -> u32 {
        self.frame_size.height.saturating_sub(2 * self.font_size())
    }

    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let settings: Self = serde_json::from_slice(data)
            .map_err(|e| CuelineError::Serialization(format!("Invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_valid() {
            return Err(CuelineError::InvalidParameter(format!(
                "frame rate {}/{} has a zero term",
                self.frame_rate.numerator, self.frame_rate.denominator
            )));
        }
        if self.style_name.trim().is_empty() {
            return Err(CuelineError::InvalidParameter(
                "style name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
