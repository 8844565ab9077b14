// Storage module for persisted state.
// Holds the auth session and the problem cache, one JSON blob per key.

pub mod paths;
pub mod store;

pub use paths::{config_path, data_dir};
pub use store::{
    FileStorage, GuardedStorage, MemoryStorage, Storage, StorageResult, read_json, write_json,
};

/// Storage key holding the `{token, login, repo_name}` session triple.
pub const SESSION_KEY: &str = "auth_session";

/// Storage key holding the entire problem-facts cache.
pub const PROBLEM_CACHE_KEY: &str = "problem_cache";
