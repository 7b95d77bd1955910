//! Structured (JSON) form of the subtitle track.
//!
//! The structured form is a JSON array of
//! `{"startPos": seconds, "dialogue": text, "endPos": seconds}` objects in
//! ascending start order. It is what the document writer consumes.

use cueline_core::{CuelineError, RationalTime, Result};
use cueline_formats::SubtitleEvent;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::SubtitleModel;

/// One entry of the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    /// Start in seconds.
    #[serde(rename = "startPos")]
    pub start: f64,
    #[serde(rename = "dialogue", default)]
    pub text: String,
    /// End in seconds. Missing ends read as zero.
    #[serde(rename = "endPos", default)]
    pub end: f64,
}

impl CueRecord {
    pub fn to_event(&self) -> SubtitleEvent {
        SubtitleEvent::new(
            RationalTime::from_seconds_f64(self.start),
            RationalTime::from_seconds_f64(self.end),
            self.text.clone(),
        )
    }
}

/// Parse the structured form.
///
/// The document must be a JSON array. Entries that are not objects, lack
/// `startPos`, or carry fields of the wrong type are skipped with a warning.
pub fn records_from_json(json: &str) -> Result<Vec<CueRecord>> {
    let raw: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CuelineError::Serialization(format!("Invalid JSON: {}", e)))?;
    let entries = raw
        .as_array()
        .ok_or_else(|| CuelineError::Parse("subtitle document is not a list".into()))?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            warn!(index, "Skipping subtitle entry that is not an object");
            continue;
        }
        if entry.get("startPos").is_none() {
            warn!(index, "Skipping subtitle entry without startPos");
            continue;
        }
        match serde_json::from_value::<CueRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(e) => warn!(index, error = %e, "Skipping malformed subtitle entry"),
        }
    }
    Ok(records)
}

impl SubtitleModel {
    /// Every cue as a structured record, in time order.
    pub fn export_records(&self) -> Vec<CueRecord> {
        self.iter()
            .map(|(_, cue)| CueRecord {
                start: cue.start.to_seconds_f64(),
                text: cue.text,
                end: cue.end.to_seconds_f64(),
            })
            .collect()
    }

    /// Serialize the track to its structured JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export_records())
            .map_err(|e| CuelineError::Serialization(format!("Failed to serialize subtitles: {}", e)))
    }
}
