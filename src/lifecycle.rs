// Lifecycle guard for the capture engine.
// Tracks whether the host page is still alive and runs cleanup callbacks on teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

type Cleanup = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Inner {
    dead: AtomicBool,
    cleanups: Mutex<Vec<Cleanup>>,
}

/// Shared alive flag plus the cleanup callbacks registered against it.
///
/// Clones share state. Every suspension point in the engine checks
/// [`Lifecycle::is_alive`] before touching storage or the page.
#[derive(Clone, Default)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        !self.inner.dead.load(Ordering::Acquire)
    }

    /// Register a callback to run on teardown. Runs immediately if already torn down.
    pub fn on_teardown(&self, cleanup: impl FnOnce() + Send + 'static) {
        if !self.is_alive() {
            cleanup();
            return;
        }
        self.inner.cleanups.lock().push(Box::new(cleanup));
    }

    /// Flip the alive flag and run every registered cleanup once.
    pub fn teardown(&self) {
        if self.inner.dead.swap(true, Ordering::AcqRel) {
            return;
        }
        let cleanups = std::mem::take(&mut *self.inner.cleanups.lock());
        tracing::debug!(count = cleanups.len(), "running teardown callbacks");
        for cleanup in cleanups {
            cleanup();
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_teardown_runs_cleanups_once() {
        let lifecycle = Lifecycle::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = Arc::clone(&count);
            lifecycle.on_teardown(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(lifecycle.is_alive());
        lifecycle.teardown();
        lifecycle.teardown();

        assert!(!lifecycle.is_alive());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_register_after_teardown_runs_immediately() {
        let lifecycle = Lifecycle::new();
        let clone = lifecycle.clone();
        lifecycle.teardown();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        clone.on_teardown(move || flag.store(true, Ordering::SeqCst));

        assert!(ran.load(Ordering::SeqCst));
        assert!(!clone.is_alive());
    }
}
