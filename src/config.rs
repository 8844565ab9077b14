// Application configuration.
// Loaded once at startup and passed explicitly to the components that need it.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_SITE_BASE: &str = "https://neetcode.io";

/// Wait intervals and timeouts used by extraction, watching, and sync.
///
/// All values are milliseconds on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Safety-net interval for detecting route changes.
    pub route_poll_ms: u64,
    /// Interval between probes of a bounded DOM wait.
    pub poll_interval_ms: u64,
    pub title_wait_ms: u64,
    pub statement_wait_ms: u64,
    pub difficulty_wait_ms: u64,
    /// Pause before the single retry of code extraction.
    pub code_retry_ms: u64,
    /// Delay between the submit click and the sync, letting the page settle.
    pub submit_settle_ms: u64,
    /// Held snapshots older than this are ignored.
    pub snapshot_max_age_ms: u64,
    pub question_tab_refresh_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            route_poll_ms: 500,
            poll_interval_ms: 100,
            title_wait_ms: 1200,
            statement_wait_ms: 800,
            difficulty_wait_ms: 2500,
            code_retry_ms: 200,
            submit_settle_ms: 3000,
            snapshot_max_age_ms: 60_000,
            question_tab_refresh_ms: 300,
        }
    }
}

impl Timings {
    pub fn route_poll(&self) -> Duration {
        Duration::from_millis(self.route_poll_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn title_wait(&self) -> Duration {
        Duration::from_millis(self.title_wait_ms)
    }

    pub fn statement_wait(&self) -> Duration {
        Duration::from_millis(self.statement_wait_ms)
    }

    pub fn difficulty_wait(&self) -> Duration {
        Duration::from_millis(self.difficulty_wait_ms)
    }

    pub fn code_retry(&self) -> Duration {
        Duration::from_millis(self.code_retry_ms)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    pub fn snapshot_max_age(&self) -> Duration {
        Duration::from_millis(self.snapshot_max_age_ms)
    }

    pub fn question_tab_refresh(&self) -> Duration {
        Duration::from_millis(self.question_tab_refresh_ms)
    }
}

/// Immutable application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the GitHub REST API.
    pub api_base: String,
    /// Origin of the problem site, used to resolve relative locations.
    pub site_base: String,
    /// OAuth application client id for the authorize URL.
    pub oauth_client_id: String,
    /// Relay that trades an authorization code for an access token.
    pub backend_url: String,
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            oauth_client_id: String::new(),
            backend_url: String::new(),
            timings: Timings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Configuration as seen by components that may run before startup finishes.
#[derive(Debug, Clone, Default)]
pub enum ConfigState {
    #[default]
    NotReady,
    Ready(Arc<Config>),
}

impl ConfigState {
    pub fn ready(config: Config) -> Self {
        ConfigState::Ready(Arc::new(config))
    }

    pub fn get(&self) -> Result<Arc<Config>> {
        match self {
            ConfigState::Ready(config) => Ok(Arc::clone(config)),
            ConfigState::NotReady => Err(SyncError::ConfigNotReady),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConfigState::Ready(_))
    }
}
