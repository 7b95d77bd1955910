//! Snap point propagation.
//!
//! Cue boundaries are forwarded to every attached snap listener. Listeners
//! are held by weak handle: the registry never keeps a listener alive, and a
//! listener that has been dropped is pruned the next time points are sent.

use std::sync::{Arc, Weak};

use tracing::debug;

/// Receiver of snap points, in frames.
///
/// A listener may receive the same frame several times (two cues touching at
/// one frame) and should reference-count points accordingly.
pub trait SnapListener: Send + Sync {
    fn add_point(&self, frame: i64);
    fn remove_point(&self, frame: i64);
}

/// Stable handle returned by [`SnapRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapSubscription(u64);

struct Subscription {
    handle: SnapSubscription,
    target: Weak<dyn SnapListener>,
}

/// Weakly held set of snap listeners.
#[derive(Default)]
pub struct SnapRegistry {
    subscriptions: Vec<Subscription>,
    next_handle: u64,
}

impl SnapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener and seed it with `existing` points.
    pub fn register<L>(
        &mut self,
        listener: &Arc<L>,
        existing: impl IntoIterator<Item = i64>,
    ) -> SnapSubscription
    where
        L: SnapListener + 'static,
    {
        for frame in existing {
            listener.add_point(frame);
        }
        let weak: Weak<L> = Arc::downgrade(listener);
        let target: Weak<dyn SnapListener> = weak;
        let handle = SnapSubscription(self.next_handle);
        self.next_handle += 1;
        self.subscriptions.push(Subscription { handle, target });
        handle
    }

    /// Detach a listener. Returns false if it was not attached.
    pub fn unregister(&mut self, handle: SnapSubscription) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.handle != handle);
        self.subscriptions.len() != before
    }

    /// Whether the listener behind `handle` is attached and still alive.
    pub fn is_live(&self, handle: SnapSubscription) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.handle == handle && s.target.strong_count() > 0)
    }

    /// Number of attached listeners that are still alive.
    pub fn live_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.target.strong_count() > 0)
            .count()
    }

    /// Number of subscriptions held, dead ones included.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn add_point(&mut self, frame: i64) {
        self.broadcast(|listener| listener.add_point(frame));
    }

    pub fn remove_point(&mut self, frame: i64) {
        self.broadcast(|listener| listener.remove_point(frame));
    }

    fn broadcast(&mut self, send: impl Fn(&dyn SnapListener)) {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| match s.target.upgrade() {
            Some(listener) => {
                send(listener.as_ref());
                true
            }
            None => false,
        });
        let pruned = before - self.subscriptions.len();
        if pruned > 0 {
            debug!(pruned, "Dropped dead snap listeners");
        }
    }
}

impl std::fmt::Debug for SnapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapRegistry")
            .field("subscriptions", &self.subscriptions.len())
            .field("live", &self.live_count())
            .finish()
    }
}
