// Remote sync module.
// Upserts a problem's files into the bound repository, one file at a time.

pub mod protocol;
pub mod render;

use async_trait::async_trait;

use crate::error::{Result, SyncError};
use crate::github::{ContentEntry, GitHubClient, PutContentsRequest};

pub use protocol::{FileOutcome, FileReport, SyncReport, sync_problem};
pub use render::{PlannedFile, plan_files, sanitize_segment};

/// Remote file store with content-hash concurrency.
///
/// A write without a hash creates; a write with the current hash updates;
/// any other combination is rejected by the store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Name of the repository's default branch.
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String>;

    /// Current content hash of a file, `None` if it does not exist.
    async fn file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>>;

    /// Entries of a directory, `None` if it does not exist. An empty path lists the root.
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<Vec<ContentEntry>>>;

    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<()>;
}

#[async_trait]
impl RemoteStore for GitHubClient {
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let repository = self.get_repo(owner, repo).await?;
        repository
            .default_branch
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SyncError::Other("repository reports no default branch".to_string()))
    }

    async fn file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        let entry = self.get_contents(owner, repo, path, branch).await?;
        Ok(entry.map(|e| e.sha))
    }

    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<Vec<ContentEntry>>> {
        GitHubClient::list_directory(self, owner, repo, path, branch).await
    }

    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<()> {
        self.put_contents(owner, repo, path, request).await?;
        Ok(())
    }
}
