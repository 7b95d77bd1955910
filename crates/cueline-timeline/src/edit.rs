//! Subtitle edit commands with undo/redo support.
//!
//! Every mutation is a `SubtitleCommand` that knows how to apply itself to a
//! [`SubtitleModel`] and produce its inverse for undo.

use cueline_core::RationalTime;
use tracing::warn;

use crate::cue::CueId;
use crate::error::EditError;
use crate::model::SubtitleModel;

/// Labels recorded alongside undo entries.
pub mod labels {
    pub const ADD: &str = "Add subtitle";
    pub const REMOVE: &str = "Delete subtitle";
    pub const EDIT: &str = "Edit subtitle";
    pub const MOVE: &str = "Move subtitle";
    pub const RESIZE: &str = "Resize subtitle";
    pub const CUT: &str = "Cut subtitle";
}

// ── Edit commands ───────────────────────────────────────────────

/// A reversible edit on the subtitle track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleCommand {
    /// Insert a cue under a fixed ID.
    Insert {
        id: CueId,
        start: RationalTime,
        end: RationalTime,
        text: String,
    },
    /// Remove a cue. Carries its content so the inverse can restore it.
    Remove {
        id: CueId,
        start: RationalTime,
        end: RationalTime,
        text: String,
    },
    SetText {
        id: CueId,
        old_text: String,
        new_text: String,
    },
    /// Duration-preserving move.
    Move {
        id: CueId,
        from: RationalTime,
        to: RationalTime,
    },
    /// Change the end, keeping the start.
    ResizeEnd {
        id: CueId,
        old_end: RationalTime,
        new_end: RationalTime,
        log_undo: bool,
    },
    /// Change the start, keeping the end.
    ResizeStart {
        id: CueId,
        old_start: RationalTime,
        new_start: RationalTime,
        log_undo: bool,
    },
    /// Several commands applied in order as one step.
    Batch(Vec<SubtitleCommand>),
}

impl SubtitleCommand {
    /// Apply this command to the model.
    ///
    /// A failing batch rolls back the steps it already applied, so the model
    /// is left as it was.
    pub fn apply(&self, model: &mut SubtitleModel) -> Result<(), EditError> {
        match self {
            Self::Insert {
                id,
                start,
                end,
                text,
            } => model.insert_cue(*id, *start, *end, text.clone(), false),
            Self::Remove { id, .. } => model.remove_cue(*id, false).map(drop),
            Self::SetText { id, new_text, .. } => model.set_text(*id, new_text.clone()).map(drop),
            Self::Move { id, to, .. } => model.move_cue(*id, *to, true, true),
            Self::ResizeEnd {
                id,
                new_end,
                log_undo,
                ..
            } => model.set_end(*id, *new_end, *log_undo),
            Self::ResizeStart {
                id,
                new_start,
                log_undo,
                ..
            } => model.set_start(*id, *new_start, *log_undo),
            Self::Batch(commands) => {
                for (applied, command) in commands.iter().enumerate() {
                    if let Err(e) = command.apply(model) {
                        for done in commands[..applied].iter().rev() {
                            if let Err(rollback) = done.inverse().apply(model) {
                                warn!(error = %rollback, "Batch rollback step failed");
                            }
                        }
                        return Err(e);
                    }
                }
                Ok(())
            }
        }
    }

    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        match self {
            Self::Insert {
                id,
                start,
                end,
                text,
            } => Self::Remove {
                id: *id,
                start: *start,
                end: *end,
                text: text.clone(),
            },
            Self::Remove {
                id,
                start,
                end,
                text,
            } => Self::Insert {
                id: *id,
                start: *start,
                end: *end,
                text: text.clone(),
            },
            Self::SetText {
                id,
                old_text,
                new_text,
            } => Self::SetText {
                id: *id,
                old_text: new_text.clone(),
                new_text: old_text.clone(),
            },
            Self::Move { id, from, to } => Self::Move {
                id: *id,
                from: *to,
                to: *from,
            },
            Self::ResizeEnd {
                id,
                old_end,
                new_end,
                log_undo,
            } => Self::ResizeEnd {
                id: *id,
                old_end: *new_end,
                new_end: *old_end,
                log_undo: *log_undo,
            },
            Self::ResizeStart {
                id,
                old_start,
                new_start,
                log_undo,
            } => Self::ResizeStart {
                id: *id,
                old_start: *new_start,
                new_start: *old_start,
                log_undo: *log_undo,
            },
            Self::Batch(commands) => {
                Self::Batch(commands.iter().rev().map(|c| c.inverse()).collect())
            }
        }
    }
}

// ── Undo stack ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct UndoEntry {
    label: String,
    command: SubtitleCommand,
}

/// Undo/redo history of labelled commands.
#[derive(Debug)]
pub struct UndoStack {
    /// Commands that have been executed (most recent last).
    undo: Vec<UndoEntry>,
    /// Commands that have been undone (most recent last).
    redo: Vec<UndoEntry>,
    max_depth: usize,
}

impl UndoStack {
    /// Create a new undo stack with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record a command that has already been applied.
    /// Clears the redo history.
    pub fn push(&mut self, label: impl Into<String>, command: SubtitleCommand) {
        self.redo.clear();
        self.undo.push(UndoEntry {
            label: label.into(),
            command,
        });
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Pop the most recent command for undo. Returns its inverse.
    pub fn undo(&mut self) -> Option<SubtitleCommand> {
        let entry = self.undo.pop()?;
        let inverse = entry.command.inverse();
        self.redo.push(entry);
        Some(inverse)
    }

    /// Pop the most recent undone command for redo. Returns the original.
    pub fn redo(&mut self) -> Option<SubtitleCommand> {
        let entry = self.redo.pop()?;
        let command = entry.command.clone();
        self.undo.push(entry);
        Some(command)
    }

    /// Put back an entry whose undo could not be applied.
    pub(crate) fn restore_undone(&mut self) {
        if let Some(entry) = self.redo.pop() {
            self.undo.push(entry);
        }
    }

    /// Put back an entry whose redo could not be applied.
    pub(crate) fn restore_redone(&mut self) {
        if let Some(entry) = self.undo.pop() {
            self.redo.push(entry);
        }
    }

    /// Label of the entry [`undo`](Self::undo) would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(|e| e.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(|e| e.label.as_str())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(200)
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Cue;
    use cueline_core::SubtitleSettings;
    use proptest::prelude::*;

    fn secs(n: i64) -> RationalTime {
        RationalTime::new(n, 1)
    }

    fn insert(id: u64, start: i64, end: i64, text: &str) -> SubtitleCommand {
        SubtitleCommand::Insert {
            id: CueId(id),
            start: secs(start),
            end: secs(end),
            text: text.into(),
        }
    }

    fn model() -> SubtitleModel {
        SubtitleModel::new(&SubtitleSettings::default())
    }

    #[test]
    fn test_undo_redo_basic() {
        let mut stack = UndoStack::new(100);
        stack.push(labels::ADD, insert(1, 0, 1, "a"));
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_label(), Some("Add subtitle"));

        let undo_cmd = stack.undo().unwrap();
        assert!(matches!(undo_cmd, SubtitleCommand::Remove { .. }));
        assert!(!stack.can_undo());
        assert_eq!(stack.redo_label(), Some("Add subtitle"));

        let redo_cmd = stack.redo().unwrap();
        assert!(matches!(redo_cmd, SubtitleCommand::Insert { .. }));
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut stack = UndoStack::new(100);
        stack.push(labels::ADD, insert(1, 0, 1, "a"));
        stack.undo();
        assert!(stack.can_redo());

        stack.push(labels::ADD, insert(2, 2, 3, "b"));
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_max_depth() {
        let mut stack = UndoStack::new(3);
        for i in 0..5 {
            stack.push(labels::ADD, insert(i, i as i64, i as i64 + 1, "x"));
        }
        assert_eq!(stack.undo_count(), 3);
        assert_eq!(UndoStack::default().max_depth, 200);
    }

    #[test]
    fn test_inverse_swaps_fields() {
        let cmd = SubtitleCommand::Move {
            id: CueId(1),
            from: secs(1),
            to: secs(5),
        };
        assert_eq!(
            cmd.inverse(),
            SubtitleCommand::Move {
                id: CueId(1),
                from: secs(5),
                to: secs(1),
            }
        );
        assert_eq!(cmd.inverse().inverse(), cmd);
    }

    #[test]
    fn test_batch_inverse_reverses_order() {
        let cmd = SubtitleCommand::Batch(vec![
            insert(1, 0, 1, "a"),
            SubtitleCommand::SetText {
                id: CueId(1),
                old_text: "a".into(),
                new_text: "b".into(),
            },
        ]);
        if let SubtitleCommand::Batch(cmds) = cmd.inverse() {
            assert_eq!(cmds.len(), 2);
            assert!(
                matches!(&cmds[0], SubtitleCommand::SetText { new_text, .. } if new_text == "a")
            );
            assert!(matches!(cmds[1], SubtitleCommand::Remove { .. }));
        } else {
            panic!("expected Batch inverse");
        }
    }

    #[test]
    fn test_apply_then_inverse_restores() {
        let mut m = model();
        let cmd = insert(1, 0, 2, "roundtrip");
        cmd.apply(&mut m).unwrap();
        assert_eq!(m.len(), 1);

        cmd.inverse().apply(&mut m).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut m = model();
        let cmd = SubtitleCommand::Batch(vec![insert(1, 0, 1, "a"), insert(2, 0, 3, "clash")]);
        assert_eq!(cmd.apply(&mut m), Err(EditError::Occupied(0)));
        assert!(m.is_empty());
    }

    #[test]
    fn test_model_undo_redo_through_stack() {
        let mut m = model();
        let mut stack = UndoStack::default();
        let id = m.request_add(secs(1), secs(2), "a", &mut stack).unwrap();
        m.request_move(id, secs(4), &mut stack).unwrap();
        m.request_edit_text(id, "b", &mut stack).unwrap();
        assert_eq!(stack.undo_label(), Some(labels::EDIT));

        assert!(m.undo(&mut stack).unwrap());
        assert!(m.undo(&mut stack).unwrap());
        assert_eq!(m.cue(id), Some(Cue::new(secs(1), secs(2), "a")));

        assert!(m.redo(&mut stack).unwrap());
        assert!(m.redo(&mut stack).unwrap());
        assert_eq!(m.cue(id), Some(Cue::new(secs(4), secs(5), "b")));
        assert!(!m.redo(&mut stack).unwrap());
    }

    #[test]
    fn test_undo_resize_left() {
        let mut m = model();
        let mut stack = UndoStack::default();
        let id = m.request_add(secs(4), secs(6), "a", &mut stack).unwrap();
        m.request_resize(id, 100, false, &mut stack).unwrap();
        assert_eq!(m.start_for_id(id), Some(secs(2)));
        m.undo(&mut stack).unwrap();
        assert_eq!(m.start_for_id(id), Some(secs(4)));
        assert_eq!(m.id_for_start(secs(2)), None);
    }

    proptest! {
        #[test]
        fn cut_then_undo_restores_store(start in 0i64..200, len in 2i64..200, split in 1i64..199) {
            prop_assume!(split < len);
            let mut m = model();
            let mut stack = UndoStack::default();
            m.request_add(
                RationalTime::from_frames(start, m.frame_rate()),
                RationalTime::from_frames(start + len, m.frame_rate()),
                "cue",
                &mut stack,
            ).unwrap();
            let before = m.all_cues();

            m.request_cut(start + split, &mut stack).unwrap();
            prop_assert_eq!(m.len(), 2);
            m.undo(&mut stack).unwrap();
            prop_assert_eq!(m.all_cues(), before);
        }

        #[test]
        fn cut_undo_order_is_interchangeable(start in 0i64..200, len in 2i64..200, split in 1i64..199) {
            prop_assume!(split < len);
            let mut m = model();
            let rate = m.frame_rate();
            let (id, _) = m.add_with_undo(
                RationalTime::from_frames(start, rate),
                RationalTime::from_frames(start + len, rate),
                "cue",
            ).unwrap();
            let before = m.all_cues();

            let (new_id, command) = m.cut(start + split).unwrap();
            // Restore the shortened cue first, then remove the new one.
            let SubtitleCommand::Batch(steps) = command else {
                panic!("cut returns a batch");
            };
            prop_assert!(steps[0].inverse().apply(&mut m).is_ok());
            m.remove(new_id, false).unwrap();
            prop_assert_eq!(m.all_cues(), before);
            prop_assert!(m.contains(id));
        }
    }
}
