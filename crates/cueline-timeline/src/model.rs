//! The subtitle model: cue store, identifier registry and presentation state.
//!
//! Cues are keyed by start time in a `BTreeMap`, so iteration order is time
//! order and a cue's row is the number of cues starting before it. The
//! ID -> start registry lives next to the store and is updated in the same
//! call as every re-keying, which keeps the two maps in step.
//!
//! Mutations come in two layers. The `pub(crate)` primitives (`insert_cue`,
//! `remove_cue`, `set_text`, `move_cue`, `set_end`, `set_start`) validate,
//! mutate, update snap points and queue notifications. The public operations
//! wrap them in a [`SubtitleCommand`] so callers get a reversible record of
//! what was done.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use cueline_core::{FrameRate, RationalTime, SubtitleSettings, TimeRange};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cue::{Cue, CueEntry, CueId};
use crate::document::DocumentState;
use crate::edit::{labels, SubtitleCommand, UndoStack};
use crate::error::EditError;
use crate::ids::{IdAllocator, SequentialIds};
use crate::notify::{CueField, FieldValue, ModelEvent};
use crate::snap::{SnapListener, SnapRegistry, SnapSubscription};

/// Model shared between the command thread and readers.
pub type SharedSubtitleModel = Arc<RwLock<SubtitleModel>>;

pub struct SubtitleModel {
    cues: BTreeMap<RationalTime, CueEntry>,
    ids: HashMap<CueId, RationalTime>,
    frame_rate: FrameRate,
    allocator: Arc<dyn IdAllocator>,
    snaps: SnapRegistry,
    events: Mutex<Vec<ModelEvent>>,
    selected: BTreeSet<CueId>,
    grabbed: BTreeSet<CueId>,
    disabled: bool,
    locked: bool,
    pub(crate) document: RwLock<DocumentState>,
}

impl SubtitleModel {
    /// Create an empty model with its own ID counter.
    pub fn new(settings: &SubtitleSettings) -> Self {
        Self::with_allocator(settings, Arc::new(SequentialIds::default()))
    }

    /// Create an empty model drawing IDs from a shared allocator.
    pub fn with_allocator(settings: &SubtitleSettings, allocator: Arc<dyn IdAllocator>) -> Self {
        Self {
            cues: BTreeMap::new(),
            ids: HashMap::new(),
            frame_rate: settings.frame_rate,
            allocator,
            snaps: SnapRegistry::new(),
            events: Mutex::new(Vec::new()),
            selected: BTreeSet::new(),
            grabbed: BTreeSet::new(),
            disabled: false,
            locked: false,
            document: RwLock::new(DocumentState::new(settings)),
        }
    }

    pub fn into_shared(self) -> SharedSubtitleModel {
        Arc::new(RwLock::new(self))
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Change the conversion rate. Stored times are untouched.
    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        self.frame_rate = rate;
    }

    /// Mint a fresh ID from the model's allocator.
    pub fn next_id(&self) -> CueId {
        self.allocator.next_id()
    }

    #[inline]
    fn frames(&self, time: RationalTime) -> i64 {
        time.to_frames(self.frame_rate)
    }

    #[inline]
    fn time_at(&self, frame: i64) -> RationalTime {
        RationalTime::from_frames(frame, self.frame_rate)
    }

    // ── Notifications ───────────────────────────────────────────

    pub(crate) fn emit(&self, event: ModelEvent) {
        self.events.lock().push(event);
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn emit_refresh(&self, range: TimeRange) {
        let (start, end) = range.to_frames(self.frame_rate);
        self.emit(ModelEvent::RefreshRange { start, end });
    }

    // ── Snap points ─────────────────────────────────────────────

    /// Attach a snap listener, seeding it with every cue boundary.
    ///
    /// End frames are seeded as well as start frames, since every later
    /// removal reports both boundaries of the cue.
    pub fn register_snap<L>(&mut self, listener: &Arc<L>) -> SnapSubscription
    where
        L: SnapListener + 'static,
    {
        let existing = self.all_snaps();
        self.snaps.register(listener, existing)
    }

    pub fn unregister_snap(&mut self, handle: SnapSubscription) -> bool {
        self.snaps.unregister(handle)
    }

    pub fn snaps(&self) -> &SnapRegistry {
        &self.snaps
    }

    /// Every start and end frame, in store order.
    pub fn all_snaps(&self) -> Vec<i64> {
        self.cues
            .iter()
            .flat_map(|(start, entry)| [self.frames(*start), self.frames(entry.end)])
            .collect()
    }

    fn swap_snap(&mut self, old: RationalTime, new: RationalTime) {
        let (old, new) = (self.frames(old), self.frames(new));
        self.snaps.remove_point(old);
        self.snaps.add_point(new);
    }

    // ── Validation helpers ──────────────────────────────────────

    fn ensure_unlocked(&self) -> Result<(), EditError> {
        if self.locked {
            Err(EditError::Locked)
        } else {
            Ok(())
        }
    }

    fn check_range(&self, start: RationalTime, end: RationalTime) -> Result<(), EditError> {
        let (start, end) = (self.frames(start), self.frames(end));
        if start < 0 || end < 0 {
            return Err(EditError::NegativeTime);
        }
        if start > end {
            return Err(EditError::InvertedRange);
        }
        Ok(())
    }

    fn ensure_free(&self, start: RationalTime) -> Result<(), EditError> {
        if self.cues.contains_key(&start) {
            Err(EditError::Occupied(self.frames(start)))
        } else {
            Ok(())
        }
    }

    /// Resolve an ID to its start key and store entry.
    fn locate(&self, id: CueId) -> Result<(RationalTime, &CueEntry), EditError> {
        let start = *self.ids.get(&id).ok_or(EditError::UnknownId(id))?;
        let entry = self.cues.get(&start).ok_or(EditError::MissingCue(id))?;
        Ok((start, entry))
    }

    fn row_of(&self, start: RationalTime) -> usize {
        self.cues.range(..start).count()
    }

    // ── Primitives ──────────────────────────────────────────────

    pub(crate) fn insert_cue(
        &mut self,
        id: CueId,
        start: RationalTime,
        end: RationalTime,
        text: String,
        temporary: bool,
    ) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        self.check_range(start, end)?;
        self.ensure_free(start)?;
        if self.ids.contains_key(&id) {
            return Err(EditError::DuplicateId(id));
        }

        self.cues.insert(start, CueEntry { id, end, text });
        self.ids.insert(id, start);
        self.allocator.observe(id);

        let row = self.row_of(start);
        let (start_frame, end_frame) = (self.frames(start), self.frames(end));
        self.snaps.add_point(start_frame);
        self.snaps.add_point(end_frame);
        self.emit(ModelEvent::RowInserted { row });
        if !temporary {
            self.emit(ModelEvent::ModelChanged);
        }
        debug!(%id, start = start_frame, end = end_frame, row, "Added subtitle");
        Ok(())
    }

    pub(crate) fn remove_cue(&mut self, id: CueId, temporary: bool) -> Result<Cue, EditError> {
        self.ensure_unlocked()?;
        let (start, _) = self.locate(id)?;
        let row = self.row_of(start);

        let entry = self
            .cues
            .remove(&start)
            .ok_or(EditError::MissingCue(id))?;
        self.ids.remove(&id);
        self.selected.remove(&id);
        self.grabbed.remove(&id);

        let (start_frame, end_frame) = (self.frames(start), self.frames(entry.end));
        self.snaps.remove_point(start_frame);
        self.snaps.remove_point(end_frame);
        self.emit(ModelEvent::RowRemoved { row });
        if !temporary {
            self.emit(ModelEvent::ModelChanged);
        }
        debug!(%id, start = start_frame, row, "Removed subtitle");
        Ok(entry.to_cue(start))
    }

    /// Replace the text of a cue, returning the previous text.
    pub(crate) fn set_text(&mut self, id: CueId, text: String) -> Result<String, EditError> {
        self.ensure_unlocked()?;
        let (start, _) = self.locate(id)?;
        let row = self.row_of(start);
        let entry = self.cues.get_mut(&start).ok_or(EditError::MissingCue(id))?;
        let previous = std::mem::replace(&mut entry.text, text);
        let range = TimeRange::from_start_end(start, entry.end);

        self.emit(ModelEvent::changed(row, &[CueField::Text]));
        self.emit(ModelEvent::ModelChanged);
        self.emit_refresh(range);
        Ok(previous)
    }

    pub(crate) fn move_cue(
        &mut self,
        id: CueId,
        new_start: RationalTime,
        update_model: bool,
        update_view: bool,
    ) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        let (old_start, _) = self.locate(id)?;
        if self.frames(new_start) < 0 {
            return Err(EditError::NegativeTime);
        }
        self.ensure_free(new_start)?;

        let entry = self
            .cues
            .remove(&old_start)
            .ok_or(EditError::MissingCue(id))?;
        let old_range = TimeRange::from_start_end(old_start, entry.end);
        let new_end = new_start + old_range.duration;
        self.cues.insert(
            new_start,
            CueEntry {
                end: new_end,
                ..entry
            },
        );
        self.ids.insert(id, new_start);

        self.swap_snap(old_start, new_start);
        self.swap_snap(old_range.end(), new_end);

        if update_view {
            let row = self.row_of(new_start);
            self.emit(ModelEvent::changed(
                row,
                &[CueField::StartFrame, CueField::EndFrame],
            ));
            let new_range = TimeRange::new(new_start, old_range.duration);
            self.emit_refresh(old_range.union(new_range));
        }
        if update_model {
            self.emit(ModelEvent::ModelChanged);
        }
        debug!(%id, from = self.frames(old_start), to = self.frames(new_start), "Moved subtitle");
        Ok(())
    }

    /// Move the end of a cue, keeping its start.
    pub(crate) fn set_end(
        &mut self,
        id: CueId,
        new_end: RationalTime,
        log_undo: bool,
    ) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        let (start, _) = self.locate(id)?;
        self.check_range(start, new_end)?;

        let row = self.row_of(start);
        let entry = self.cues.get_mut(&start).ok_or(EditError::MissingCue(id))?;
        let old_end = std::mem::replace(&mut entry.end, new_end);

        self.swap_snap(old_end, new_end);
        self.emit(ModelEvent::changed(row, &[CueField::EndFrame]));
        if log_undo {
            self.emit(ModelEvent::ModelChanged);
            self.emit(ModelEvent::refresh_between(
                self.frames(old_end),
                self.frames(new_end),
            ));
        }
        Ok(())
    }

    /// Move the start of a cue, keeping its end. Re-keys the store entry.
    pub(crate) fn set_start(
        &mut self,
        id: CueId,
        new_start: RationalTime,
        log_undo: bool,
    ) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        let (old_start, entry) = self.locate(id)?;
        self.check_range(new_start, entry.end)?;
        if new_start == old_start {
            return Ok(());
        }
        self.ensure_free(new_start)?;

        let entry = self
            .cues
            .remove(&old_start)
            .ok_or(EditError::MissingCue(id))?;
        self.cues.insert(new_start, entry);
        self.ids.insert(id, new_start);

        self.swap_snap(old_start, new_start);
        let row = self.row_of(new_start);
        self.emit(ModelEvent::changed(row, &[CueField::StartFrame]));
        if log_undo {
            self.emit(ModelEvent::ModelChanged);
            self.emit(ModelEvent::refresh_between(
                self.frames(old_start),
                self.frames(new_start),
            ));
        }
        Ok(())
    }

    // ── Operations ──────────────────────────────────────────────

    /// Insert a cue under a caller-chosen ID.
    ///
    /// Fails without touching the model if either bound is negative in
    /// frames, `start` lies after `end`, another cue already starts at
    /// `start`, or `id` is already registered. Zero-length cues are accepted.
    pub fn add(
        &mut self,
        id: CueId,
        start: RationalTime,
        end: RationalTime,
        text: impl Into<String>,
        temporary: bool,
    ) -> Result<(), EditError> {
        self.insert_cue(id, start, end, text.into(), temporary)
    }

    /// Insert a cue under a freshly minted ID and return the applied command.
    pub fn add_with_undo(
        &mut self,
        start: RationalTime,
        end: RationalTime,
        text: impl Into<String>,
    ) -> Result<(CueId, SubtitleCommand), EditError> {
        let id = self.next_id();
        let command = SubtitleCommand::Insert {
            id,
            start,
            end,
            text: text.into(),
        };
        command.apply(self)?;
        Ok((id, command))
    }

    /// Delete a cue, returning what it held.
    pub fn remove(&mut self, id: CueId, temporary: bool) -> Result<Cue, EditError> {
        self.remove_cue(id, temporary)
    }

    pub fn remove_with_undo(&mut self, id: CueId) -> Result<SubtitleCommand, EditError> {
        let (start, entry) = self.locate(id)?;
        let command = SubtitleCommand::Remove {
            id,
            start,
            end: entry.end,
            text: entry.text.clone(),
        };
        command.apply(self)?;
        Ok(command)
    }

    /// Delete every cue. Returns how many were removed.
    pub fn remove_all(&mut self) -> Result<usize, EditError> {
        self.ensure_unlocked()?;
        let ids: Vec<CueId> = self.cues.values().map(|entry| entry.id).collect();
        for id in &ids {
            self.remove_cue(*id, false)?;
        }
        Ok(ids.len())
    }

    /// Replace the text of a cue.
    pub fn edit_text(
        &mut self,
        id: CueId,
        text: impl Into<String>,
    ) -> Result<SubtitleCommand, EditError> {
        let (_, entry) = self.locate(id)?;
        let command = SubtitleCommand::SetText {
            id,
            old_text: entry.text.clone(),
            new_text: text.into(),
        };
        command.apply(self)?;
        Ok(command)
    }

    /// Move a cue so it starts at `new_start`, keeping its duration.
    ///
    /// Fails if the ID is unknown or another cue (including this one) already
    /// starts at `new_start`. With `update_view` the row and the union of the
    /// old and new intervals are refreshed; with `update_model` the document
    /// is flagged stale.
    pub fn move_to(
        &mut self,
        id: CueId,
        new_start: RationalTime,
        update_model: bool,
        update_view: bool,
    ) -> Result<(), EditError> {
        self.move_cue(id, new_start, update_model, update_view)
    }

    pub fn move_with_undo(
        &mut self,
        id: CueId,
        new_start: RationalTime,
    ) -> Result<SubtitleCommand, EditError> {
        let (from, _) = self.locate(id)?;
        let command = SubtitleCommand::Move {
            id,
            from,
            to: new_start,
        };
        command.apply(self)?;
        Ok(command)
    }

    /// Resize a cue to `size` frames.
    ///
    /// With `extend_right` the start stays put and the end becomes
    /// `start + size`; otherwise the end stays put and the start becomes
    /// `end - size`, which fails if another cue already starts there.
    /// `log_undo` additionally flags the document stale and refreshes the
    /// affected frames.
    pub fn resize(
        &mut self,
        id: CueId,
        size: i64,
        extend_right: bool,
        log_undo: bool,
    ) -> Result<SubtitleCommand, EditError> {
        if size < 0 {
            return Err(EditError::InvalidSize(size));
        }
        let (start, entry) = self.locate(id)?;
        let length = self.time_at(size);
        let command = if extend_right {
            SubtitleCommand::ResizeEnd {
                id,
                old_end: entry.end,
                new_end: start + length,
                log_undo,
            }
        } else {
            SubtitleCommand::ResizeStart {
                id,
                old_start: start,
                new_start: entry.end - length,
                log_undo,
            }
        };
        command.apply(self)?;
        Ok(command)
    }

    /// Split the cue covering `position` (in frames) in two.
    ///
    /// The covering cue is shortened to end at `position` and a new cue with
    /// the same text fills `[position, old end)`. Returns the new cue's ID
    /// and a batch of both steps. If the second step fails the first is
    /// rolled back.
    pub fn cut(&mut self, position: i64) -> Result<(CueId, SubtitleCommand), EditError> {
        self.ensure_unlocked()?;
        let at = self.time_at(position);
        let (start, entry) = self
            .cues
            .range(..=at)
            .find(|(start, entry)| TimeRange::from_start_end(**start, entry.end).contains(at))
            .ok_or(EditError::NothingToCut(position))?;
        let (start, id, end, text) = (*start, entry.id, entry.end, entry.text.clone());

        let shorten = SubtitleCommand::ResizeEnd {
            id,
            old_end: end,
            new_end: at,
            log_undo: false,
        };
        shorten.apply(self)?;

        let new_id = self.next_id();
        let insert = SubtitleCommand::Insert {
            id: new_id,
            start: at,
            end,
            text,
        };
        if let Err(e) = insert.apply(self) {
            if let Err(rollback) = shorten.inverse().apply(self) {
                debug!(error = %rollback, "Cut rollback failed");
            }
            return Err(e);
        }
        debug!(%id, %new_id, position, "Cut subtitle");
        Ok((new_id, SubtitleCommand::Batch(vec![shorten, insert])))
    }

    /// Apply a command, typically one popped from an [`UndoStack`].
    pub fn apply(&mut self, command: &SubtitleCommand) -> Result<(), EditError> {
        command.apply(self)
    }

    // ── Undo-logged requests ────────────────────────────────────

    pub fn request_add(
        &mut self,
        start: RationalTime,
        end: RationalTime,
        text: impl Into<String>,
        stack: &mut UndoStack,
    ) -> Result<CueId, EditError> {
        let (id, command) = self.add_with_undo(start, end, text)?;
        stack.push(labels::ADD, command);
        Ok(id)
    }

    pub fn request_remove(&mut self, id: CueId, stack: &mut UndoStack) -> Result<(), EditError> {
        let command = self.remove_with_undo(id)?;
        stack.push(labels::REMOVE, command);
        Ok(())
    }

    pub fn request_edit_text(
        &mut self,
        id: CueId,
        text: impl Into<String>,
        stack: &mut UndoStack,
    ) -> Result<(), EditError> {
        let command = self.edit_text(id, text)?;
        stack.push(labels::EDIT, command);
        Ok(())
    }

    pub fn request_move(
        &mut self,
        id: CueId,
        new_start: RationalTime,
        stack: &mut UndoStack,
    ) -> Result<(), EditError> {
        let command = self.move_with_undo(id, new_start)?;
        stack.push(labels::MOVE, command);
        Ok(())
    }

    pub fn request_resize(
        &mut self,
        id: CueId,
        size: i64,
        extend_right: bool,
        stack: &mut UndoStack,
    ) -> Result<(), EditError> {
        let command = self.resize(id, size, extend_right, true)?;
        stack.push(labels::RESIZE, command);
        Ok(())
    }

    pub fn request_cut(&mut self, position: i64, stack: &mut UndoStack) -> Result<CueId, EditError> {
        let (id, command) = self.cut(position)?;
        stack.push(labels::CUT, command);
        Ok(id)
    }

    /// Undo the most recent entry. Returns false when there is nothing to undo.
    ///
    /// On failure the entry stays on the undo side of the stack.
    pub fn undo(&mut self, stack: &mut UndoStack) -> Result<bool, EditError> {
        let Some(inverse) = stack.undo() else {
            return Ok(false);
        };
        if let Err(e) = inverse.apply(self) {
            stack.restore_undone();
            return Err(e);
        }
        Ok(true)
    }

    /// Redo the most recently undone entry.
    pub fn redo(&mut self, stack: &mut UndoStack) -> Result<bool, EditError> {
        let Some(command) = stack.redo() else {
            return Ok(false);
        };
        if let Err(e) = command.apply(self) {
            stack.restore_redone();
            return Err(e);
        }
        Ok(true)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn contains(&self, id: CueId) -> bool {
        self.ids.contains_key(&id)
    }

    /// Cues with their IDs, in time order.
    pub fn iter(&self) -> impl Iterator<Item = (CueId, Cue)> + '_ {
        self.cues
            .iter()
            .map(|(start, entry)| (entry.id, entry.to_cue(*start)))
    }

    /// Every cue in time order.
    pub fn all_cues(&self) -> Vec<Cue> {
        self.iter().map(|(_, cue)| cue).collect()
    }

    pub fn cue(&self, id: CueId) -> Option<Cue> {
        let (start, entry) = self.locate(id).ok()?;
        Some(entry.to_cue(start))
    }

    pub fn text(&self, id: CueId) -> Option<&str> {
        self.locate(id).ok().map(|(_, entry)| entry.text.as_str())
    }

    /// The cue starting exactly at `start`.
    pub fn cue_at(&self, start: RationalTime) -> Option<(CueId, Cue)> {
        self.cues
            .get(&start)
            .map(|entry| (entry.id, entry.to_cue(start)))
    }

    pub fn id_for_start(&self, start: RationalTime) -> Option<CueId> {
        self.cues.get(&start).map(|entry| entry.id)
    }

    pub fn start_for_id(&self, id: CueId) -> Option<RationalTime> {
        self.ids.get(&id).copied()
    }

    /// Row of a cue, derived from its current position in the store.
    pub fn row_for_id(&self, id: CueId) -> Option<usize> {
        self.ids.get(&id).map(|start| self.row_of(*start))
    }

    pub fn id_at_row(&self, row: usize) -> Option<CueId> {
        self.cues.values().nth(row).map(|entry| entry.id)
    }

    /// Read one field of a row, as the view does.
    pub fn field(&self, row: usize, field: CueField) -> Option<FieldValue> {
        let (start, entry) = self.cues.iter().nth(row)?;
        let value = match field {
            CueField::Text => FieldValue::Text(entry.text.clone()),
            CueField::Id => FieldValue::Id(entry.id),
            CueField::StartPos => FieldValue::Seconds(start.to_seconds_f64()),
            CueField::EndPos => FieldValue::Seconds(entry.end.to_seconds_f64()),
            CueField::StartFrame => FieldValue::Frame(self.frames(*start)),
            CueField::EndFrame => FieldValue::Frame(self.frames(entry.end)),
            CueField::Selected => FieldValue::Flag(self.selected.contains(&entry.id)),
            CueField::Grabbed => FieldValue::Flag(self.grabbed.contains(&entry.id)),
        };
        Some(value)
    }

    /// The cue immediately before `id` in time order.
    pub fn previous(&self, id: CueId) -> Option<CueId> {
        let start = self.ids.get(&id)?;
        self.cues
            .range(..*start)
            .next_back()
            .map(|(_, entry)| entry.id)
    }

    /// The cue immediately after `id` in time order.
    pub fn next(&self, id: CueId) -> Option<CueId> {
        let start = self.ids.get(&id)?;
        self.cues
            .range((Excluded(*start), Unbounded))
            .next()
            .map(|(_, entry)| entry.id)
    }

    /// IDs of cues touching the frame range, in time order.
    ///
    /// A negative `end_frame` leaves the range open to the right. A cue is
    /// included when it does not start after `end_frame` and either starts or
    /// ends at or after `start_frame`.
    pub fn items_in_range(&self, start_frame: i64, end_frame: i64) -> Vec<CueId> {
        let from = self.time_at(start_frame);
        let to = (end_frame >= 0).then(|| self.time_at(end_frame));
        self.cues
            .iter()
            .filter(|(start, _)| to.map_or(true, |to| **start <= to))
            .filter(|(start, entry)| **start >= from || entry.end >= from)
            .map(|(_, entry)| entry.id)
            .collect()
    }

    /// Duration of a cue in frames.
    pub fn playtime(&self, id: CueId) -> Option<i64> {
        let (start, entry) = self.locate(id).ok()?;
        Some(self.frames(entry.end - start))
    }

    pub fn end_frame(&self, id: CueId) -> Option<i64> {
        self.locate(id).ok().map(|(_, entry)| self.frames(entry.end))
    }

    /// Start and end frames of a cue.
    pub fn in_out(&self, id: CueId) -> Option<(i64, i64)> {
        self.cue(id)
            .map(|cue| (self.frames(cue.start), self.frames(cue.end)))
    }

    /// Frame at which the last cue ends, 0 when empty.
    pub fn track_duration(&self) -> i64 {
        self.cues
            .values()
            .map(|entry| self.frames(entry.end))
            .max()
            .unwrap_or(0)
    }

    /// Gap containing `position`: its first frame and, if a cue follows, the
    /// frame where that cue starts. `None` when a cue covers `position`.
    fn gap_around(&self, position: i64) -> Option<(i64, Option<i64>)> {
        let at = self.time_at(position);
        let covered = self
            .cues
            .range(..=at)
            .any(|(start, entry)| TimeRange::from_start_end(*start, entry.end).contains(at));
        if covered {
            return None;
        }
        let gap_start = self
            .cues
            .range(..=at)
            .map(|(_, entry)| self.frames(entry.end))
            .max()
            .unwrap_or(0);
        let gap_end = self
            .cues
            .range((Excluded(at), Unbounded))
            .next()
            .map(|(start, _)| self.frames(*start));
        Some((gap_start, gap_end))
    }

    /// Frames of empty space around `position`.
    ///
    /// `Some(0)` inside a cue, `None` when the gap runs to the end of the
    /// track.
    pub fn blank_size_at(&self, position: i64) -> Option<i64> {
        match self.gap_around(position) {
            None => Some(0),
            Some((start, Some(end))) => Some(end - start),
            Some((_, None)) => None,
        }
    }

    /// First empty frame of the gap containing `position`, `None` inside a cue.
    pub fn blank_start(&self, position: i64) -> Option<i64> {
        self.gap_around(position).map(|(start, _)| start)
    }

    // ── Presentation state ──────────────────────────────────────

    fn notify_field(&self, id: CueId, field: CueField) {
        if let Some(row) = self.row_for_id(id) {
            self.emit(ModelEvent::changed(row, &[field]));
        }
    }

    /// Mark a cue as selected or not. Returns false for an unknown ID.
    pub fn set_selected(&mut self, id: CueId, select: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        if select {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
        self.notify_field(id, CueField::Selected);
        true
    }

    pub fn is_selected(&self, id: CueId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selection(&self) -> impl Iterator<Item = CueId> + '_ {
        self.selected.iter().copied()
    }

    /// Toggle the grab state of a cue. Returns the new state.
    pub fn switch_grab(&mut self, id: CueId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let grabbed = if self.grabbed.remove(&id) {
            false
        } else {
            self.grabbed.insert(id);
            true
        };
        self.notify_field(id, CueField::Grabbed);
        grabbed
    }

    pub fn is_grabbed(&self, id: CueId) -> bool {
        self.grabbed.contains(&id)
    }

    pub fn clear_grab(&mut self) {
        let released = std::mem::take(&mut self.grabbed);
        for id in released {
            self.notify_field(id, CueField::Grabbed);
        }
    }

    pub fn switch_disabled(&mut self) {
        self.disabled = !self.disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Toggle the lock. A locked track rejects every mutation.
    pub fn switch_locked(&mut self) {
        self.locked = !self.locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl fmt::Debug for SubtitleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubtitleModel")
            .field("cues", &self.cues.len())
            .field("frame_rate", &self.frame_rate)
            .field("snaps", &self.snaps)
            .field("locked", &self.locked)
            .field("disabled", &self.disabled)
            .finish()
    }
}
