use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{DraftEnvelope, DraftResult, DraftStore};

/// In-memory draft store for tests and hosts without durable storage.
///
/// Entries are kept as serialized JSON so the same encode/decode path runs
/// as with the file-backed store.
#[derive(Default)]
pub struct MemoryDraftStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw entry, bypassing serialization. Handy for injecting
    /// pre-existing or deliberately malformed drafts.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries().insert(key.into(), raw.into());
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock means a holder panicked mid-write; the map itself is
    // still usable, so recover the guard.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, key: &str, draft: &DraftEnvelope) -> DraftResult<()> {
        let json = serde_json::to_string(draft)?;
        self.entries().insert(key.to_string(), json);
        Ok(())
    }

    fn load(&self, key: &str) -> DraftResult<Option<DraftEnvelope>> {
        let raw = self.entries().get(key).cloned();
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn clear(&self, key: &str) -> DraftResult<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn list(&self) -> DraftResult<Vec<String>> {
        Ok(self.entries().keys().cloned().collect())
    }
}
