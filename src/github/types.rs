// GitHub API request and response types.
// Covers the user, repository metadata, and contents endpoints used by sync.

use serde::{Deserialize, Serialize};

/// GitHub user or organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
}

/// GitHub repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// Missing on some partial payloads; never assumed.
    pub default_branch: Option<String>,
}

/// Kind of entry returned by the contents endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Unknown,
}

/// One file or directory entry from the contents endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    /// Blob hash; required as the concurrency token when updating.
    pub sha: String,
    #[serde(rename = "type")]
    pub entry_type: ContentType,
}

/// Body of a create-or-update file request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PutContentsRequest {
    pub message: String,
    /// Base64 of the UTF-8 file contents.
    pub content: String,
    pub branch: String,
    /// Present only when updating an existing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Response of a create-or-update file request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentsResponse {
    pub content: Option<ContentEntry>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_request_omits_missing_sha() {
        let create = PutContentsRequest {
            message: "add".into(),
            content: "aGk=".into(),
            branch: "trunk".into(),
            sha: None,
        };
        let json = serde_json::to_value(&create).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "trunk");

        let update = PutContentsRequest {
            sha: Some("abc".into()),
            ..create
        };
        assert_eq!(serde_json::to_value(&update).unwrap()["sha"], "abc");
    }

    #[test]
    fn test_content_entry_parse() {
        let entry: ContentEntry = serde_json::from_str(
            r#"{"name":"Easy","path":"Easy","sha":"d1","type":"dir","size":0}"#,
        )
        .unwrap();
        assert_eq!(entry.entry_type, ContentType::Dir);
        assert_eq!(entry.sha, "d1");
    }

    #[test]
    fn test_repository_without_default_branch() {
        let repo: Repository = serde_json::from_str(
            r#"{"name":"solutions","full_name":"me/solutions","private":false}"#,
        )
        .unwrap();
        assert!(repo.default_branch.is_none());
    }
}
