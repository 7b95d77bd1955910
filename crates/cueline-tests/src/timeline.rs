//! Integration tests for the subtitle track.
//!
//! Exercises cross-crate interactions between cueline-core,
//! cueline-formats, and cueline-timeline.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::thread;

use cueline_core::{FrameRate, RationalTime, SubtitleSettings};
use cueline_formats::{read_file, SubtitleFormat};
use cueline_timeline::{
    Cue, CueId, EditError, ModelEvent, SequentialIds, SnapListener, SubtitleModel, UndoStack,
};
use parking_lot::Mutex;
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

fn secs(n: i64) -> RationalTime {
    RationalTime::new(n, 1)
}

fn model() -> SubtitleModel {
    SubtitleModel::new(&SubtitleSettings::default())
}

#[derive(Default)]
struct SnapIndex {
    points: Mutex<BTreeMap<i64, usize>>,
}

impl SnapIndex {
    fn frames(&self) -> Vec<i64> {
        self.points.lock().keys().copied().collect()
    }
}

impl SnapListener for SnapIndex {
    fn add_point(&self, frame: i64) {
        *self.points.lock().entry(frame).or_default() += 1;
    }

    fn remove_point(&self, frame: i64) {
        let mut points = self.points.lock();
        if let Some(count) = points.get_mut(&frame) {
            *count -= 1;
            if *count == 0 {
                points.remove(&frame);
            }
        }
    }
}

// ── Editing scenarios ──────────────────────────────────────────

#[test]
fn add_then_cut_hello() {
    let mut m = model();
    m.add(CueId(1), secs(0), secs(2), "Hello", false).unwrap();
    assert_eq!(m.all_cues(), vec![Cue::new(secs(0), secs(2), "Hello")]);

    let (new_id, _) = m.cut(25).unwrap();
    assert_eq!(new_id, CueId(2));
    assert_eq!(
        m.all_cues(),
        vec![
            Cue::new(secs(0), secs(1), "Hello"),
            Cue::new(secs(1), secs(2), "Hello"),
        ]
    );
}

#[test]
fn editing_session_undoes_back_to_empty() {
    let mut m = model();
    let mut history = UndoStack::default();

    let a = m.request_add(secs(0), secs(4), "first", &mut history).unwrap();
    let b = m.request_add(secs(6), secs(8), "second", &mut history).unwrap();
    m.request_move(b, secs(10), &mut history).unwrap();
    m.request_resize(a, 50, true, &mut history).unwrap();
    m.request_cut(25, &mut history).unwrap();
    m.request_edit_text(a, "first (edited)", &mut history).unwrap();
    m.request_remove(b, &mut history).unwrap();
    assert_eq!(history.undo_count(), 7);

    while m.undo(&mut history).unwrap() {}
    assert!(m.is_empty());

    while m.redo(&mut history).unwrap() {}
    assert_eq!(
        m.all_cues(),
        vec![
            Cue::new(secs(0), secs(1), "first (edited)"),
            Cue::new(secs(1), secs(2), "first"),
        ]
    );
}

#[test]
fn rejected_edits_are_not_recorded() {
    let mut m = model();
    let mut history = UndoStack::default();
    let a = m.request_add(secs(0), secs(1), "a", &mut history).unwrap();
    m.request_add(secs(2), secs(3), "b", &mut history).unwrap();

    assert_eq!(
        m.request_move(a, secs(2), &mut history),
        Err(EditError::Occupied(50))
    );
    assert_eq!(
        m.request_cut(40, &mut history),
        Err(EditError::NothingToCut(40))
    );
    assert_eq!(history.undo_count(), 2);
}

#[test]
fn frame_rate_changes_conversions_only() {
    let mut m = model();
    m.add(CueId(1), secs(1), secs(2), "a", false).unwrap();
    assert_eq!(m.in_out(CueId(1)), Some((25, 50)));

    m.set_frame_rate(FrameRate::FPS_30);
    assert_eq!(m.in_out(CueId(1)), Some((30, 60)));
    assert_eq!(m.cue(CueId(1)).unwrap().start, secs(1));
}

#[test]
fn models_sharing_an_allocator_never_collide() {
    let settings = SubtitleSettings::default();
    let ids = Arc::new(SequentialIds::default());
    let mut left = SubtitleModel::with_allocator(&settings, ids.clone());
    let mut right = SubtitleModel::with_allocator(&settings, ids);

    let (a, _) = left.add_with_undo(secs(0), secs(1), "l").unwrap();
    let (b, _) = right.add_with_undo(secs(0), secs(1), "r").unwrap();
    right.add(CueId(40), secs(2), secs(3), "fixed", false).unwrap();
    let (c, _) = left.add_with_undo(secs(2), secs(3), "l2").unwrap();

    assert_ne!(a, b);
    assert_eq!(c, CueId(41));
}

#[test]
fn shared_model_reads_from_threads() {
    let mut m = model();
    for i in 0..10 {
        m.add(CueId(i + 1), secs(i as i64 * 2), secs(i as i64 * 2 + 1), "x", false)
            .unwrap();
    }
    let shared = m.into_shared();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || shared.read().track_duration())
        })
        .collect();
    shared.write().remove(CueId(10), false).unwrap();

    for reader in readers {
        let duration = reader.join().unwrap();
        assert!(duration == 475 || duration == 425);
    }
    assert_eq!(shared.read().track_duration(), 425);
}

// ── Snap points ────────────────────────────────────────────────

#[test]
fn snap_index_tracks_the_model() {
    let mut m = model();
    m.add(CueId(1), secs(1), secs(2), "a", false).unwrap();

    let index = Arc::new(SnapIndex::default());
    let handle = m.register_snap(&index);
    assert_eq!(index.frames(), vec![25, 50]);

    let mut history = UndoStack::default();
    m.request_cut(30, &mut history).unwrap();
    assert_eq!(index.frames(), vec![25, 30, 50]);

    m.undo(&mut history).unwrap();
    assert_eq!(index.frames(), vec![25, 50]);

    assert!(m.snaps().is_live(handle));
    drop(index);
    assert!(!m.snaps().is_live(handle));
    m.add(CueId(5), secs(3), secs(4), "b", false).unwrap();
    assert!(m.snaps().is_empty());
}

// ── Files ──────────────────────────────────────────────────────

#[test]
fn srt_example_imports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.srt");
    fs::write(&path, "1\n00:00:01,000 --> 00:00:02,500\nHi there\n").unwrap();

    let mut m = model();
    assert_eq!(m.import_file(&path, 0).unwrap(), 1);
    assert_eq!(
        m.all_cues(),
        vec![Cue::new(secs(1), RationalTime::new(5, 2), "Hi there")]
    );
}

#[test]
fn ass_import_keeps_commas_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("styled.ass");
    fs::write(
        &path,
        "[Script Info]\nScriptType: v4.00+\nPlayResX: 640\nPlayResY: 360\n\n\
         [V4+ Styles]\nFormat: Name, Fontname, Fontsize\nStyle: Caption,Arial,24\n\n\
         [Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
         Dialogue: 0,0:00:01.50,0:00:03.00,Caption,,0000,0000,0000,,Well, hello\\Nthere\n",
    )
    .unwrap();

    let mut m = model();
    assert_eq!(m.import_file(&path, 0).unwrap(), 1);
    assert_eq!(
        m.all_cues(),
        vec![Cue::new(RationalTime::new(3, 2), secs(3), "Well, hello\nthere")]
    );
    let header = m.ass_header();
    assert_eq!(header.style_name, "Caption");
    assert!(header.script_info.contains("PlayResX: 640"));

    let out = dir.path().join("styled-out.ass");
    m.write_document(&m.to_json().unwrap(), Some(&out)).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("Style: Caption,Arial,24"));
    assert!(written.contains("Dialogue: 0,0:00:01.50,0:00:03.00,Caption,,0000,0000,0000,,Well, hello\\Nthere"));
}

#[test]
fn export_formats_follow_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = model();
    m.add(CueId(1), secs(61), secs(62), "minute", false).unwrap();
    let json = m.to_json().unwrap();

    for name in ["out.srt", "out.ass", "out.txt"] {
        let path = dir.path().join(name);
        m.write_document(&json, Some(&path)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        match SubtitleFormat::for_output(&path) {
            SubtitleFormat::Srt => assert!(text.contains("00:01:01,000 --> 00:01:02,000")),
            SubtitleFormat::Ass => assert!(text.contains("0:01:01.00,0:01:02.00")),
        }
    }
}

#[test]
fn write_back_reports_filter_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("track.srt");
    let m = model();
    m.set_document_path(&path);

    let written = m
        .write_document(
            r#"[{"startPos": 2.0, "dialogue": "kept", "endPos": 3.0}, "junk", {"dialogue": "x"}]"#,
            None,
        )
        .unwrap();
    assert_eq!(written, 1);
    assert_eq!(
        m.take_events(),
        vec![ModelEvent::FilterAttached { path: path.clone() }]
    );

    let doc = read_file(&path).unwrap();
    assert_eq!(doc.events.len(), 1);
    assert_eq!(doc.events[0].text, "kept");
}

proptest! {
    #[test]
    fn export_then_import_reproduces_cues(
        cues in prop::collection::btree_map(0i64..5000, (0i64..200, "[a-z]{1,12}( [a-z]{1,12})?"), 1..12)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut m = model();
        for (start_ms, (len_ms, text)) in &cues {
            m.add_with_undo(
                RationalTime::from_millis(*start_ms * 10),
                RationalTime::from_millis(*start_ms * 10 + *len_ms * 10),
                text.clone(),
            ).unwrap();
        }

        for name in ["round.srt", "round.ass"] {
            let path = dir.path().join(name);
            m.write_document(&m.to_json().unwrap(), Some(&path)).unwrap();
            let mut reloaded = model();
            reloaded.import_file(&path, 0).unwrap();
            prop_assert_eq!(reloaded.all_cues(), m.all_cues());
        }
    }
}
