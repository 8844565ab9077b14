// Sync protocol.
// Resolves the default branch, then reads-before-writes each planned file in order.

use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::extract::Metadata;
use crate::github::PutContentsRequest;
use crate::session::SyncTarget;

use super::RemoteStore;
use super::render::{PlannedFile, plan_files};

/// Whether a file was created or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub outcome: FileOutcome,
}

/// Result of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub branch: String,
    pub files: Vec<FileReport>,
}

async fn upsert(
    remote: &dyn RemoteStore,
    target: &SyncTarget<'_>,
    branch: &str,
    file: &PlannedFile,
) -> Result<FileOutcome> {
    let sha = remote
        .file_sha(target.owner, target.repo, &file.path, branch)
        .await?;
    let outcome = if sha.is_some() {
        FileOutcome::Updated
    } else {
        FileOutcome::Created
    };

    let request = PutContentsRequest {
        message: file.message.clone(),
        content: file.content.clone(),
        branch: branch.to_string(),
        sha,
    };
    remote
        .put_file(target.owner, target.repo, &file.path, &request)
        .await?;
    Ok(outcome)
}

/// Write the code, statement, and notes files for one problem.
///
/// Files are written strictly in order; the first failure stops the rest
/// and reports which paths were already written. Nothing is retried.
pub async fn sync_problem(
    remote: &dyn RemoteStore,
    target: &SyncTarget<'_>,
    meta: &Metadata,
) -> Result<SyncReport> {
    let repo_name = format!("{}/{}", target.owner, target.repo);
    let branch = remote
        .default_branch(target.owner, target.repo)
        .await
        .map_err(|e| SyncError::BranchResolution {
            repo: repo_name.clone(),
            source: Box::new(e),
        })?;
    debug!(repo = %repo_name, branch = %branch, "resolved default branch");

    let mut files = Vec::new();
    for file in plan_files(meta) {
        match upsert(remote, target, &branch, &file).await {
            Ok(outcome) => files.push(FileReport {
                path: file.path,
                outcome,
            }),
            Err(e) => {
                return Err(SyncError::FileUpsert {
                    path: file.path,
                    written: files.into_iter().map(|f| f.path).collect(),
                    source: Box::new(e),
                });
            }
        }
    }

    info!(repo = %repo_name, title = %meta.title, "synced {} files", files.len());
    Ok(SyncReport { branch, files })
}
