//! The subtitle document file behind the track.
//!
//! The model owns one document path and the ASS header used when writing
//! it. Writing the document re-renders the whole file from the structured
//! form and attaches or detaches the rendering filter depending on whether
//! anything was written.

use std::path::{Path, PathBuf};

use cueline_core::{CuelineError, RationalTime, Result, SubtitleSettings};
use cueline_formats::{read_file, write_file, AssHeader, SubtitleEvent};
use tracing::{info, warn};

use crate::model::SubtitleModel;
use crate::notify::ModelEvent;
use crate::serialization::records_from_json;

/// Header, path and filter state, guarded by the model's document lock.
#[derive(Debug, Clone)]
pub(crate) struct DocumentState {
    header: AssHeader,
    path: Option<PathBuf>,
    /// File the rendering filter reads, when attached.
    filter: Option<PathBuf>,
}

impl DocumentState {
    pub(crate) fn new(settings: &SubtitleSettings) -> Self {
        Self {
            header: AssHeader::from_settings(settings),
            path: settings.document_path.clone(),
            filter: None,
        }
    }
}

impl SubtitleModel {
    /// Add every cue of a subtitle file, shifted by `offset_frames`.
    ///
    /// Each cue gets a fresh ID. Cues that cannot be placed (negative after
    /// shifting, or starting where a cue already starts) are skipped with a
    /// warning. An ASS header replaces the one used for write-back. Returns
    /// the number of cues added.
    pub fn import_file(&mut self, path: &Path, offset_frames: i64) -> Result<usize> {
        let document = read_file(path)?;
        if let Some(header) = document.header {
            self.document.write().header = header;
        }
        Ok(self.insert_events(path, document.events, offset_frames))
    }

    /// Replace the track with the contents of `path` and adopt it as the
    /// document file.
    ///
    /// The file is read before anything changes, so a failed read leaves the
    /// track and the document path as they were.
    pub fn open_document(&mut self, path: &Path) -> Result<usize> {
        let document = read_file(path)?;
        self.remove_all()?;
        {
            let mut state = self.document.write();
            state.path = Some(path.to_path_buf());
            if let Some(header) = document.header {
                state.header = header;
            }
        }
        let added = self.insert_events(path, document.events, 0);
        self.attach_filter(path, added);
        Ok(added)
    }

    fn insert_events(
        &mut self,
        path: &Path,
        events: Vec<SubtitleEvent>,
        offset_frames: i64,
    ) -> usize {
        let offset = RationalTime::from_frames(offset_frames, self.frame_rate());
        let mut added = 0;
        for event in events {
            let id = self.next_id();
            match self.insert_cue(id, event.start + offset, event.end + offset, event.text, false) {
                Ok(()) => added += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping imported subtitle"),
            }
        }
        info!(path = %path.display(), added, offset_frames, "Imported subtitles");
        added
    }

    /// Write the structured form to disk.
    ///
    /// `path` overrides the document path. The format follows the suffix:
    /// `.ass`/`.ssa` write ASS, anything else SRT. The whole write holds the
    /// document lock. Returns the number of cues written.
    pub fn write_document(&self, json: &str, path: Option<&Path>) -> Result<usize> {
        let mut document = self.document.write();
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => document.path.clone().ok_or_else(|| {
                CuelineError::InvalidParameter("no subtitle document path".into())
            })?,
        };

        let events: Vec<SubtitleEvent> = records_from_json(json)?
            .iter()
            .map(|record| record.to_event())
            .collect();
        let written = write_file(&target, &document.header, &events)?;

        if written > 0 {
            document.filter = Some(target.clone());
            self.emit(ModelEvent::FilterAttached { path: target });
        } else {
            document.filter = None;
            self.emit(ModelEvent::FilterDetached);
        }
        Ok(written)
    }

    /// Write the current track to the document file.
    pub fn sync_document(&self) -> Result<usize> {
        let json = self.to_json()?;
        self.write_document(&json, None)
    }

    /// Copy the document file to `dest`.
    pub fn copy_subtitle(&self, dest: &Path, check_overwrite: bool) -> Result<()> {
        let document = self.document.read();
        let source = document
            .path
            .as_deref()
            .ok_or_else(|| CuelineError::NotFound("no subtitle document path".into()))?;
        if !source.exists() {
            return Err(CuelineError::NotFound(format!("{}", source.display())));
        }
        if check_overwrite && dest.exists() {
            return Err(CuelineError::InvalidParameter(format!(
                "{} already exists",
                dest.display()
            )));
        }
        std::fs::copy(source, dest)?;
        Ok(())
    }

    pub fn document_path(&self) -> Option<PathBuf> {
        self.document.read().path.clone()
    }

    pub fn set_document_path(&self, path: impl Into<PathBuf>) {
        self.document.write().path = Some(path.into());
    }

    /// Whether the rendering filter currently reads the document.
    pub fn is_filter_attached(&self) -> bool {
        self.document.read().filter.is_some()
    }

    /// Header used when writing ASS.
    pub fn ass_header(&self) -> AssHeader {
        self.document.read().header.clone()
    }

    fn attach_filter(&self, path: &Path, cues: usize) {
        let mut document = self.document.write();
        if cues > 0 {
            document.filter = Some(path.to_path_buf());
            self.emit(ModelEvent::FilterAttached {
                path: path.to_path_buf(),
            });
        } else {
            document.filter = None;
            self.emit(ModelEvent::FilterDetached);
        }
    }
}
