// Route watching for a single-page host.
// Detects in-app navigation and gates one-time mounting per route.

use crate::page::ElementId;
use crate::problem::identity;

/// Notifications from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Load,
    ReadyStateChange,
    /// `history.pushState` was called.
    PushState,
    /// `history.replaceState` was called.
    ReplaceState,
    PopState,
    /// Structural change somewhere under the document body.
    DomMutation,
    /// A click on an element with the given visible label.
    Click { label: String },
    /// The submit control was activated.
    SubmitClicked(ElementId),
    /// The injected sync button was activated.
    SyncClicked,
    PageHide,
    Unload,
}

/// Route tracking state.
#[derive(Debug, Clone, Default)]
pub struct RouteWatcher {
    last_known_route: String,
    mounted_for: Option<String>,
}

impl RouteWatcher {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            last_known_route: href.into(),
            mounted_for: None,
        }
    }

    /// Record the current location. Returns `true` if it differs from the last one seen.
    pub fn observe(&mut self, href: &str) -> bool {
        if self.last_known_route == href {
            return false;
        }
        self.last_known_route = href.to_string();
        true
    }

    /// Claim one-time setup for the route at `href`.
    ///
    /// Succeeds once per distinct path and query on a problem view.
    pub fn claim_mount(&mut self, href: &str) -> bool {
        if !identity::is_problem_page(href) {
            return false;
        }
        let Some(key) = identity::route_key(href) else {
            return false;
        };
        if self.mounted_for.as_deref() == Some(key.as_str()) {
            return false;
        }
        self.mounted_for = Some(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_detects_changes_only() {
        let mut watcher = RouteWatcher::new("https://neetcode.io/problems/two-sum");
        assert!(!watcher.observe("https://neetcode.io/problems/two-sum"));
        assert!(watcher.observe("https://neetcode.io/problems/3sum"));
        assert!(!watcher.observe("https://neetcode.io/problems/3sum"));
    }

    #[test]
    fn test_claim_mount_once_per_route_and_query() {
        let mut watcher = RouteWatcher::default();
        assert!(watcher.claim_mount("https://neetcode.io/problems/two-sum"));
        assert!(!watcher.claim_mount("https://neetcode.io/problems/two-sum"));
        assert!(!watcher.claim_mount("https://neetcode.io/problems/two-sum#hash"));
        assert!(watcher.claim_mount("https://neetcode.io/problems/two-sum?tab=solution"));
        assert!(!watcher.claim_mount("https://neetcode.io/roadmap"));
    }
}
