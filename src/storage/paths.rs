// Storage path utilities.
// Resolves platform directories for persisted state and configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "neetsync")
}

/// Base directory for persisted state (~/.local/share/neetsync on Linux).
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the configuration file.
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
}

/// Path of the blob holding a single storage key.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_key(key)))
}

/// Sanitize a storage key for use as a file name.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
