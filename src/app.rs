// Capture engine and page event loop.
// Routes host page events to mounting, snapshotting, and syncing.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior, sleep_until};
use tracing::{debug, info};

use crate::config::Timings;
use crate::error::{Result, StorageError, SyncError};
use crate::extract::Extractor;
use crate::github::GitHubClient;
use crate::lifecycle::Lifecycle;
use crate::notice::{Notice, Notifier};
use crate::page::Page;
use crate::problem::{ProblemCache, identity};
use crate::session;
use crate::snapshot::SnapshotCoordinator;
use crate::storage::{GuardedStorage, Storage};
use crate::sync::{RemoteStore, SyncReport, sync_problem};
use crate::watcher::{PageEvent, RouteWatcher};

/// Opens a remote store for a session token.
pub type Connector = Arc<dyn Fn(&str) -> Result<Arc<dyn RemoteStore>> + Send + Sync>;

/// Connector that talks to the GitHub REST API at `api_base`.
pub fn github_connector(api_base: impl Into<String>) -> Connector {
    let api_base = api_base.into();
    Arc::new(move |token: &str| -> Result<Arc<dyn RemoteStore>> {
        let client = GitHubClient::with_base(token, &api_base)?;
        Ok(Arc::new(client) as Arc<dyn RemoteStore>)
    })
}

/// Everything one host page needs to capture and sync solutions.
pub struct Engine {
    extractor: Extractor,
    storage: GuardedStorage,
    connect: Connector,
    notifier: Arc<dyn Notifier>,
    snapshots: SnapshotCoordinator,
    lifecycle: Lifecycle,
    timings: Timings,
}

impl Engine {
    pub fn new(
        page: Arc<dyn Page>,
        storage: Arc<dyn Storage>,
        lifecycle: Lifecycle,
        timings: Timings,
        connect: Connector,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let storage = GuardedStorage::new(storage, lifecycle.clone());
        let cache = ProblemCache::new(storage.clone());
        let extractor = Extractor::new(page, cache, lifecycle.clone(), timings.clone());
        Self {
            extractor,
            storage,
            connect,
            notifier,
            snapshots: SnapshotCoordinator::new(timings.snapshot_max_age()),
            lifecycle,
            timings,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn snapshots(&self) -> &SnapshotCoordinator {
        &self.snapshots
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn page(&self) -> &dyn Page {
        self.extractor.page().as_ref()
    }

    /// Inject the sync button, hook the submit control, and refresh the cache.
    pub fn attach(&self) {
        if !self.lifecycle.is_alive() {
            return;
        }
        self.mount_controls();
        self.extractor.refresh_cache();
    }

    /// Put back page controls a re-render may have replaced.
    pub fn mount_controls(&self) {
        if !self.lifecycle.is_alive() {
            return;
        }
        if self.page().inject_sync_affordance() {
            debug!("sync button mounted");
        }
        self.hook_submit();
    }

    /// Hook the submit control currently rendered, once per instance.
    pub fn hook_submit(&self) -> bool {
        match self.page().submit_affordance() {
            Some(id) => self.snapshots.hook(id),
            None => false,
        }
    }

    /// Gather metadata now and hold it for the next sync.
    pub async fn capture_snapshot(&self) -> bool {
        match self.extractor.gather_metadata().await {
            Some(metadata) => {
                self.snapshots.hold(metadata);
                true
            }
            None => false,
        }
    }

    /// Run one sync and report the outcome to the user.
    ///
    /// After teardown nothing is read, written, or reported.
    pub async fn push(&self) -> Result<SyncReport> {
        if !self.lifecycle.is_alive() {
            return Err(StorageError::ContextInvalidated.into());
        }

        let result = self.try_push().await;
        if !self.lifecycle.is_alive() {
            return result;
        }
        match &result {
            Ok(report) => {
                info!(branch = %report.branch, "push complete");
                self.notifier.notify(Notice::info("Pushed to GitHub!"));
            }
            Err(e) => self.notifier.notify(Notice::error(format!("Push failed: {}", e))),
        }
        result
    }

    async fn try_push(&self) -> Result<SyncReport> {
        let session = session::load(&self.storage).unwrap_or_default();
        let target = session.target()?;

        let metadata = match self.snapshots.take() {
            Some(held) => held,
            None => self
                .extractor
                .gather_metadata()
                .await
                .ok_or(SyncError::NoCode)?,
        };

        let remote = (self.connect)(target.token)?;
        sync_problem(remote.as_ref(), &target, &metadata).await
    }
}

#[derive(Debug, Clone, Copy)]
enum Deferred {
    Push,
    /// Snapshot the page first, then push once the delay has passed.
    CaptureThenPush,
    Refresh,
}

/// Event loop over one host page.
pub struct App {
    engine: Arc<Engine>,
    watcher: RouteWatcher,
    jobs: Arc<Mutex<JoinSet<()>>>,
}

impl App {
    pub fn new(engine: Engine) -> Self {
        let watcher = RouteWatcher::new(engine.page().href());
        let jobs = Arc::new(Mutex::new(JoinSet::new()));

        let pending = Arc::downgrade(&jobs);
        engine.lifecycle.on_teardown(move || {
            if let Some(jobs) = pending.upgrade() {
                jobs.lock().abort_all();
            }
        });

        Self {
            engine: Arc::new(engine),
            watcher,
            jobs,
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Process page events until teardown or until the event source closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent>) {
        let period = self.engine.timings.route_poll().max(Duration::from_millis(1));
        let mut route_poll = time::interval(period);
        route_poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.ensure_mounted();
        while self.engine.lifecycle.is_alive() {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = route_poll.tick() => self.check_route(),
            }
        }
        debug!("event loop stopped");
    }

    pub async fn handle(&mut self, event: PageEvent) {
        if !self.engine.lifecycle.is_alive() {
            return;
        }
        match event {
            PageEvent::Load | PageEvent::ReadyStateChange => {
                self.ensure_mounted();
            }
            PageEvent::PushState | PageEvent::ReplaceState | PageEvent::PopState => {
                self.check_route()
            }
            PageEvent::DomMutation => {
                if self.on_problem_page() && !self.ensure_mounted() {
                    self.engine.mount_controls();
                }
            }
            PageEvent::Click { label } => {
                if label.trim().eq_ignore_ascii_case("question") {
                    self.defer(self.engine.timings.question_tab_refresh(), Deferred::Refresh);
                }
            }
            PageEvent::SubmitClicked(id) => {
                if self.engine.snapshots.is_hooked(id) {
                    self.defer(self.engine.timings.submit_settle(), Deferred::CaptureThenPush);
                    // Let the capture read the page before the next event; it only
                    // holds up the loop if it has to wait for the page.
                    task::yield_now().await;
                }
            }
            PageEvent::SyncClicked => self.defer(Duration::ZERO, Deferred::Push),
            PageEvent::PageHide | PageEvent::Unload => self.engine.lifecycle.teardown(),
        }
    }

    fn on_problem_page(&self) -> bool {
        identity::is_problem_page(&self.engine.page().href())
    }

    fn check_route(&mut self) {
        let href = self.engine.page().href();
        if self.watcher.observe(&href) {
            debug!(href = %href, "route changed");
            self.ensure_mounted();
        }
    }

    /// One-time setup for the current route. Returns whether it ran.
    fn ensure_mounted(&mut self) -> bool {
        if !self.engine.lifecycle.is_alive() {
            return false;
        }
        let href = self.engine.page().href();
        if !self.watcher.claim_mount(&href) {
            return false;
        }
        self.engine.attach();
        true
    }

    /// Run `job` once `delay` has passed, unless teardown comes first.
    fn defer(&self, delay: Duration, job: Deferred) {
        let engine = Arc::clone(&self.engine);
        let due = Instant::now() + delay;

        let mut jobs = self.jobs.lock();
        while jobs.try_join_next().is_some() {}
        jobs.spawn(async move {
            if let Deferred::CaptureThenPush = job {
                if !engine.capture_snapshot().await {
                    debug!("no snapshot captured at submit");
                }
            }
            sleep_until(due).await;
            if !engine.lifecycle.is_alive() {
                return;
            }
            match job {
                Deferred::Push | Deferred::CaptureThenPush => {
                    if let Err(e) = engine.push().await {
                        debug!(error = %e, "deferred push failed");
                    }
                }
                Deferred::Refresh => {
                    engine.extractor.refresh_cache();
                }
            }
        });
    }

    /// Deferred jobs that have not finished yet.
    pub fn pending_jobs(&self) -> usize {
        let mut jobs = self.jobs.lock();
        while jobs.try_join_next().is_some() {}
        jobs.len()
    }
}
