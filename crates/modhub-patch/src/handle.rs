//! Reversal handles — per-patch undo capabilities and aggregate patch sets.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

/// Undo action produced by a patch provider. Consumed on first use.
pub type UndoFn = Box<dyn FnOnce() + Send>;

/// Opaque handle to one applied patch.
///
/// [`PatchHandle::restore`] reverts the patch exactly once; every later call
/// is a no-op. Concurrent restores collapse into a single effective
/// restoration because the undo action is drained under a lock.
pub struct PatchHandle {
    /// Member name the patch targets (diagnostics only).
    method: String,
    /// The provider's undo action, until spent.
    undo: Mutex<Option<UndoFn>>,
}

impl PatchHandle {
    /// Wraps a provider undo action into an idempotent handle.
    pub fn new(method: impl Into<String>, undo: UndoFn) -> Self {
        Self {
            method: method.into(),
            undo: Mutex::new(Some(undo)),
        }
    }

    /// Name of the patched member.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Reverts the patch if it is still live.
    pub fn restore(&self) {
        let undo = self
            .undo
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(undo) = undo {
            undo();
            debug!(method = %self.method, "Patch restored");
        }
    }

    /// Returns whether the patch has already been reverted.
    pub fn is_restored(&self) -> bool {
        self.undo
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl fmt::Debug for PatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchHandle")
            .field("method", &self.method)
            .field("restored", &self.is_restored())
            .finish()
    }
}

/// The handles produced by one activation, in application order.
///
/// An empty set is the normal outcome when the target module was never
/// resolved; reverting it is a safe no-op.
#[derive(Debug, Default)]
pub struct PatchSet {
    /// Handles in the order their patches were applied.
    handles: Vec<PatchHandle>,
}

impl PatchSet {
    /// Wraps a list of handles into a set.
    pub fn new(handles: Vec<PatchHandle>) -> Self {
        Self { handles }
    }

    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of handles in the set (live or not).
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns whether the set holds no handles.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of handles not yet restored.
    pub fn live_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_restored()).count()
    }

    /// The individual handles.
    pub fn handles(&self) -> &[PatchHandle] {
        &self.handles
    }

    /// Reverts every handle in the set. Handles already restored are
    /// skipped, so calling this repeatedly is safe.
    pub fn restore_all(&self) {
        for handle in &self.handles {
            handle.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handle(method: &str, counter: &Arc<AtomicUsize>) -> PatchHandle {
        let counter = Arc::clone(counter);
        PatchHandle::new(
            method,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_restore_runs_undo_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = counting_handle("setMode", &counter);

        assert!(!handle.is_restored());
        handle.restore();
        handle.restore();
        handle.restore();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_restored());
    }

    #[test]
    fn test_restore_all_reverts_every_handle_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let set = PatchSet::new(vec![
            counting_handle("a", &counter),
            counting_handle("b", &counter),
            counting_handle("c", &counter),
        ]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.live_count(), 3);

        set.restore_all();
        set.restore_all();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(set.live_count(), 0);
    }

    #[test]
    fn test_empty_set_restore_is_noop() {
        let set = PatchSet::empty();
        assert!(set.is_empty());
        set.restore_all();
        assert_eq!(set.live_count(), 0);
    }

    #[test]
    fn test_partial_restore_then_aggregate() {
        let counter = Arc::new(AtomicUsize::new(0));
        let set = PatchSet::new(vec![
            counting_handle("a", &counter),
            counting_handle("b", &counter),
        ]);

        set.handles()[1].restore();
        assert_eq!(set.live_count(), 1);

        set.restore_all();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
