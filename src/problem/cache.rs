// Persistent problem cache.
// Maps problem identifiers to last-known facts, updated only by read-merge-write.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::StorageError;
use crate::storage::{GuardedStorage, PROBLEM_CACHE_KEY, Storage, StorageResult, write_json};

use super::facts::{FactsPatch, ProblemFacts};
use super::identity::ProblemId;

/// Entire cache as persisted under one storage key.
pub type CacheStore = HashMap<ProblemId, ProblemFacts>;

/// Problem cache over guarded storage.
///
/// Every operation is safe after teardown: reads yield empty results and
/// writes report `ContextInvalidated` instead of touching storage.
#[derive(Clone)]
pub struct ProblemCache {
    storage: GuardedStorage,
}

impl ProblemCache {
    pub fn new(storage: GuardedStorage) -> Self {
        Self { storage }
    }

    /// Stored blob as raw entries. Entries are left undecoded so one bad
    /// entry never costs the others.
    fn load_entries(&self) -> StorageResult<Map<String, Value>> {
        match self.storage.get(PROBLEM_CACHE_KEY)? {
            None => Ok(Map::new()),
            Some(Value::Object(entries)) => Ok(entries),
            Some(other) => Err(StorageError::Json(serde::de::Error::custom(format!(
                "problem cache is not an object: {}",
                other
            )))),
        }
    }

    /// Load the full store. Unreadable entries are skipped; any read failure
    /// yields an empty mapping.
    pub fn load(&self) -> CacheStore {
        let entries = match self.load_entries() {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "problem cache load failed");
                return CacheStore::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value(value) {
                Ok(facts) => Some((ProblemId::from(id.as_str()), facts)),
                Err(e) => {
                    debug!(problem = %id, error = %e, "skipping unreadable cache entry");
                    None
                }
            })
            .collect()
    }

    /// Persist the full store.
    pub fn save(&self, store: &CacheStore) -> StorageResult<()> {
        write_json(&self.storage, PROBLEM_CACHE_KEY, store).inspect_err(|e| {
            debug!(error = %e, "problem cache save failed");
        })
    }

    pub fn read(&self, id: &ProblemId) -> Option<ProblemFacts> {
        self.load().remove(id)
    }

    /// Merge a patch into the entry for `id`, creating it if needed.
    ///
    /// Writes only when the merge changed something, and only this entry is
    /// rewritten; every other stored entry goes back exactly as it was read.
    /// Nothing is written if the stored blob cannot be read.
    pub fn patch(&self, id: &ProblemId, patch: FactsPatch) -> StorageResult<ProblemFacts> {
        let mut entries = self.load_entries().inspect_err(|e| {
            debug!(error = %e, "problem cache unreadable, not patching");
        })?;

        let mut facts = match entries.get(id.as_str()) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                debug!(problem = %id, error = %e, "replacing unreadable cache entry");
                ProblemFacts::default()
            }),
            None => ProblemFacts::default(),
        };
        if patch.is_empty() || !facts.merge(patch, Utc::now()) {
            return Ok(facts);
        }

        entries.insert(id.as_str().to_string(), serde_json::to_value(&facts)?);
        self.storage
            .set(PROBLEM_CACHE_KEY, Value::Object(entries))
            .inspect_err(|e| debug!(error = %e, "problem cache save failed"))?;
        debug!(problem = %id, "problem cache updated");
        Ok(facts)
    }
}
