// neetsync library.
// Captures solved problems from a host page and syncs them into a GitHub repository.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod github;
pub mod lifecycle;
pub mod notice;
pub mod page;
pub mod problem;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod watcher;

pub use app::{App, Engine};
pub use config::{Config, ConfigState};
pub use error::{Result, SyncError};
