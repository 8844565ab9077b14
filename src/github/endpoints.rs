// GitHub API endpoint functions.
// Typed methods for the user, repository, and contents REST endpoints.

use crate::error::Result;

use super::client::{GitHubClient, encode_path};
use super::types::{ContentEntry, Owner, PutContentsRequest, PutContentsResponse, Repository};

impl GitHubClient {
    /// Get the authenticated user.
    pub async fn get_current_user(&self) -> Result<Owner> {
        let response = self.get("/user").await?;
        let user: Owner = response.json().await?;
        Ok(user)
    }

    /// Get a specific repository.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get a file entry at a branch. `None` when the file does not exist.
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<ContentEntry>> {
        let params = [("ref", branch)];
        let endpoint = format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path));
        match self.get_optional(&endpoint, &params).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// List a directory at a branch. `None` when the directory does not exist.
    pub async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<Vec<ContentEntry>>> {
        let params = [("ref", branch)];
        let endpoint = if path.is_empty() {
            format!("/repos/{}/{}/contents", owner, repo)
        } else {
            format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path))
        };
        match self.get_optional(&endpoint, &params).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// Create or update a file.
    pub async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<PutContentsResponse> {
        let endpoint = format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path));
        let response = self.put_json(&endpoint, request).await?;
        let written: PutContentsResponse = response.json().await?;
        Ok(written)
    }
}
