//! Cueline Formats - plain-text subtitle interchange
//!
//! Readers and writers for the two supported text formats:
//! - SubRip (`.srt`): numbered time-range blocks
//! - Advanced SubStation Alpha (`.ass`, `.ssa`): sectioned script with
//!   a style definition and dialogue lines

pub mod ass;
pub mod srt;
pub mod timestamp;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use cueline_core::{CuelineError, RationalTime, Result};
use tracing::info;

pub use ass::{AssDocument, AssHeader};
pub use timestamp::{format_ass, format_srt, parse_timestamp};

/// One timed line of text as read from or written to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEvent {
    pub start: RationalTime,
    pub end: RationalTime,
    pub text: String,
}

impl SubtitleEvent {
    pub fn new(start: RationalTime, end: RationalTime, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Supported text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Ass,
}

impl SubtitleFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "srt" => Some(Self::Srt),
            "ass" | "ssa" => Some(Self::Ass),
            _ => None,
        }
    }

    /// Format used when writing to `path`: ASS for `.ass`/`.ssa`, SRT otherwise.
    pub fn for_output(path: &Path) -> Self {
        Self::from_path(path).unwrap_or(Self::Srt)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
        }
    }
}

/// Result of reading a subtitle file.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub format: SubtitleFormat,
    pub events: Vec<SubtitleEvent>,
    /// Header sections, present for ASS input.
    pub header: Option<AssHeader>,
}

/// Read a subtitle file, choosing the parser from its extension.
pub fn read_file(path: &Path) -> Result<ParsedDocument> {
    let format = SubtitleFormat::from_path(path).ok_or_else(|| {
        CuelineError::UnsupportedFormat(format!("{}", path.display()))
    })?;
    let reader = BufReader::new(File::open(path)?);
    let document = match format {
        SubtitleFormat::Srt => ParsedDocument {
            format,
            events: srt::parse(reader)?,
            header: None,
        },
        SubtitleFormat::Ass => {
            let AssDocument { header, events } = ass::parse(reader)?;
            ParsedDocument {
                format,
                events,
                header: Some(header),
            }
        }
    };
    info!(path = %path.display(), ?format, cues = document.events.len(), "Read subtitle file");
    Ok(document)
}

/// Write events to `path` in the format chosen by its suffix.
///
/// The file is only created once the caller has a complete event list, so a
/// failure to open it leaves nothing half-written. Returns the number of cues
/// written.
pub fn write_file(path: &Path, header: &AssHeader, events: &[SubtitleEvent]) -> Result<usize> {
    let format = SubtitleFormat::for_output(path);
    let mut out = BufWriter::new(File::create(path)?);
    let written = match format {
        SubtitleFormat::Srt => srt::write(&mut out, events)?,
        SubtitleFormat::Ass => ass::write(&mut out, header, events)?,
    };
    out.flush()?;
    info!(path = %path.display(), ?format, cues = written, "Wrote subtitle file");
    Ok(written)
}
