// Bounded polling waits.
// Repeatedly probes the page until a value shows up, the timeout passes, or teardown.

use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::lifecycle::Lifecycle;
use crate::page::{Node, Page};

/// Probe until `probe` yields a value or `timeout` elapses.
///
/// Probes at least once. Returns `None` as soon as the lifecycle is torn down.
pub async fn wait_for<T>(
    lifecycle: &Lifecycle,
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> Option<T>,
) -> Option<T> {
    let start = Instant::now();
    loop {
        if !lifecycle.is_alive() {
            return None;
        }
        if let Some(found) = probe() {
            return Some(found);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        sleep(interval).await;
    }
}

/// First element matching any selector, in selector order.
pub fn first_present(page: &dyn Page, selectors: &[&str]) -> Option<Node> {
    selectors.iter().find_map(|s| page.query(s))
}
