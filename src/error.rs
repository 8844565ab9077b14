// Error types for neetsync.
// Covers GitHub API failures, storage failures, and capture/sync preconditions.

use thiserror::Error;

/// Failure reported by a persisted-storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The runtime that owned the storage has been torn down.
    #[error("storage context invalidated")]
    ContextInvalidated,

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token (HTTP 401: {body})")]
    Unauthorized { body: String },

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Please authenticate and set your repository first")]
    NotConfigured,

    #[error("Configuration has not been loaded yet")]
    ConfigNotReady,

    #[error("Failed to gather problem data: no code found in the editor")]
    NoCode,

    #[error("Could not resolve default branch for {repo}: {source}")]
    BranchResolution {
        repo: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error(
        "Commit failed for {path} ({count} file(s) already written): {source}",
        count = .written.len()
    )]
    FileUpsert {
        path: String,
        written: Vec<String>,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
