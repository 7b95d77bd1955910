//! Cue identifier allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cue::CueId;

/// Source of fresh cue IDs, shared with the rest of the timeline.
pub trait IdAllocator: Send + Sync {
    /// Mint an ID that has not been handed out before.
    fn next_id(&self) -> CueId;

    /// Called whenever an ID chosen by a caller is registered, so that later
    /// minted IDs do not collide with it.
    fn observe(&self, _id: CueId) {}
}

/// Monotonic counter.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&self) -> CueId {
        CueId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn observe(&self, id: CueId) {
        self.next.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }
}
