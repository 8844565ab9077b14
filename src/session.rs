// Auth session persistence.
// The {token, login, repo} triple written by login and settings, read by sync.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::storage::{SESSION_KEY, Storage, read_json, write_json};

/// Credentials and target repository for sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSession {
    pub token: String,
    pub login: String,
    pub repo_name: Option<String>,
}

/// Borrowed view of a session with every field present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTarget<'a> {
    pub token: &'a str,
    pub owner: &'a str,
    pub repo: &'a str,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && !self.login.is_empty()
    }

    /// Token, login, and repository, or `NotConfigured` if any is missing.
    pub fn target(&self) -> Result<SyncTarget<'_>> {
        match self.repo_name.as_deref() {
            Some(repo) if self.is_authenticated() && !repo.is_empty() => Ok(SyncTarget {
                token: &self.token,
                owner: &self.login,
                repo,
            }),
            _ => Err(SyncError::NotConfigured),
        }
    }
}

/// Read the stored session. Missing or unreadable state is `None`.
pub fn load(storage: &dyn Storage) -> Option<AuthSession> {
    match read_json(storage, SESSION_KEY) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, "session load failed");
            None
        }
    }
}

pub fn save(storage: &dyn Storage, session: &AuthSession) -> Result<()> {
    write_json(storage, SESSION_KEY, session)?;
    Ok(())
}

/// Store a fresh login, keeping any repository already bound.
pub fn store_login(storage: &dyn Storage, token: &str, login: &str) -> Result<AuthSession> {
    let mut session = load(storage).unwrap_or_default();
    session.token = token.to_string();
    session.login = login.to_string();
    save(storage, &session)?;
    Ok(session)
}

/// Bind the target repository name. Blank names are rejected.
pub fn bind_repo(storage: &dyn Storage, name: &str) -> Result<AuthSession> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SyncError::Validation(
            "Repository name cannot be empty".to_string(),
        ));
    }

    let mut session = load(storage).unwrap_or_default();
    session.repo_name = Some(name.to_string());
    save(storage, &session)?;
    Ok(session)
}

/// Forget token, login, and repository in a single storage operation.
pub fn deauthorize(storage: &dyn Storage) -> Result<()> {
    storage.remove(&[SESSION_KEY])?;
    Ok(())
}
