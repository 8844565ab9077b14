// Snapshot coordination for submit-triggered syncs.
// Holds metadata captured at the moment of the submit click until the delayed sync consumes it.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::extract::Metadata;
use crate::page::ElementId;

#[derive(Debug, Clone)]
struct Held {
    metadata: Metadata,
    captured_at: Instant,
}

/// One-shot snapshot slot plus the submit control currently hooked.
#[derive(Debug)]
pub struct SnapshotCoordinator {
    slot: Mutex<Option<Held>>,
    hooked: Mutex<Option<ElementId>>,
    max_age: Duration,
}

impl SnapshotCoordinator {
    pub fn new(max_age: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            hooked: Mutex::new(None),
            max_age,
        }
    }

    /// Hook a submit control. Returns `false` if this instance was already hooked.
    ///
    /// Hooking a new instance releases the previous one, which the page has
    /// replaced.
    pub fn hook(&self, id: ElementId) -> bool {
        self.hooked.lock().replace(id) != Some(id)
    }

    pub fn is_hooked(&self, id: ElementId) -> bool {
        *self.hooked.lock() == Some(id)
    }

    /// Replace whatever is held with a freshly captured snapshot.
    pub fn hold(&self, metadata: Metadata) {
        *self.slot.lock() = Some(Held {
            metadata,
            captured_at: Instant::now(),
        });
    }

    /// Consume the held snapshot. Stale snapshots are discarded and yield `None`.
    pub fn take(&self) -> Option<Metadata> {
        let held = self.slot.lock().take()?;
        if held.captured_at.elapsed() > self.max_age {
            tracing::debug!("discarding stale snapshot");
            return None;
        }
        Some(held.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::protocol::tests::two_sum;

    #[test]
    fn test_hook_once_per_instance() {
        let coordinator = SnapshotCoordinator::new(Duration::from_secs(60));
        assert!(coordinator.hook(ElementId(1)));
        assert!(!coordinator.hook(ElementId(1)));
        assert!(coordinator.hook(ElementId(2)));
        assert!(coordinator.is_hooked(ElementId(2)));
        assert!(!coordinator.is_hooked(ElementId(3)));
    }

    #[test]
    fn test_replaced_instance_is_released() {
        let coordinator = SnapshotCoordinator::new(Duration::from_secs(60));
        for id in 1..=50 {
            assert!(coordinator.hook(ElementId(id)));
        }
        assert!(coordinator.is_hooked(ElementId(50)));
        assert!(!coordinator.is_hooked(ElementId(1)));
        assert!(!coordinator.is_hooked(ElementId(49)));
    }

    #[tokio::test]
    async fn test_take_is_one_shot() {
        let coordinator = SnapshotCoordinator::new(Duration::from_secs(60));
        coordinator.hold(two_sum());

        assert_eq!(coordinator.take().unwrap().title, "Two Sum");
        assert!(coordinator.take().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_snapshot_discarded() {
        let coordinator = SnapshotCoordinator::new(Duration::from_secs(5));
        coordinator.hold(two_sum());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(coordinator.take().is_none());
    }
}
