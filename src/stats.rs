// Solved problem statistics.
// Counts problem folders per difficulty in the bound repository.

use crate::error::Result;
use crate::github::{ContentEntry, ContentType};
use crate::problem::Difficulty;
use crate::session::SyncTarget;
use crate::sync::RemoteStore;

/// Solved problem counts by difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolvedStats {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl SolvedStats {
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

fn is_dir(entry: &ContentEntry) -> bool {
    entry.entry_type == ContentType::Dir
}

async fn count_solved(
    remote: &dyn RemoteStore,
    target: &SyncTarget<'_>,
    branch: &str,
    root: &[ContentEntry],
    difficulty: Difficulty,
) -> Result<usize> {
    let Some(folder) = root
        .iter()
        .find(|e| is_dir(e) && e.name.eq_ignore_ascii_case(difficulty.as_str()))
    else {
        return Ok(0);
    };

    let entries = remote
        .list_directory(target.owner, target.repo, &folder.path, branch)
        .await?
        .unwrap_or_default();
    Ok(entries.iter().filter(|e| is_dir(e)).count())
}

/// Count solved problems at the repository's default branch.
///
/// Folder names match case-insensitively; a missing folder counts as zero.
pub async fn solved_stats(
    remote: &dyn RemoteStore,
    target: &SyncTarget<'_>,
) -> Result<SolvedStats> {
    let branch = remote.default_branch(target.owner, target.repo).await?;
    let root = remote
        .list_directory(target.owner, target.repo, "", &branch)
        .await?
        .unwrap_or_default();

    Ok(SolvedStats {
        easy: count_solved(remote, target, &branch, &root, Difficulty::Easy).await?,
        medium: count_solved(remote, target, &branch, &root, Difficulty::Medium).await?,
        hard: count_solved(remote, target, &branch, &root, Difficulty::Hard).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::PutContentsRequest;
    use crate::sync::protocol::tests::MemoryRemote;

    const TARGET: SyncTarget<'static> = SyncTarget {
        token: "t",
        owner: "octocat",
        repo: "solutions",
    };

    async fn put(remote: &MemoryRemote, path: &str) {
        let request = PutContentsRequest {
            message: "add".into(),
            content: String::new(),
            branch: "main".into(),
            sha: None,
        };
        remote
            .put_file("octocat", "solutions", path, &request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_counts_problem_folders() {
        let remote = MemoryRemote::with_branch("main");
        put(&remote, "Easy/Two_Sum/Two_Sum.py").await;
        put(&remote, "Easy/Two_Sum/notes.md").await;
        put(&remote, "easy/Valid_Anagram/Valid_Anagram.py").await;
        put(&remote, "Hard/LRU/LRU.cpp").await;
        put(&remote, "Hard/README.md").await;
        put(&remote, "Uncategorized/Foo/Foo.txt").await;

        let stats = solved_stats(&remote, &TARGET).await.unwrap();
        // The first case-insensitive match wins, so "Easy" and "easy" are not summed.
        assert_eq!(stats.easy, 1);
        assert_eq!(stats.medium, 0);
        assert_eq!(stats.hard, 1);
        assert_eq!(stats.total(), 2);
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let remote = MemoryRemote::with_branch("main");
        assert_eq!(
            solved_stats(&remote, &TARGET).await.unwrap(),
            SolvedStats::default()
        );
    }

    #[tokio::test]
    async fn test_branch_failure_propagates() {
        let remote = MemoryRemote::default();
        assert!(solved_stats(&remote, &TARGET).await.is_err());
    }
}
