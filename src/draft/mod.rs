//! Pluggable draft persistence for resume-after-reload.

pub mod json_store;
pub mod memory;
pub mod paths;

pub use json_store::JsonDraftStore;
pub use memory::MemoryDraftStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::state::FormState;

pub type DraftResult<T> = Result<T, DraftError>;

/// Current on-disk draft schema.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid draft key: {0}")]
    InvalidKey(String),
}

/// Versioned wrapper around a persisted form state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEnvelope {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub values: FormState,
}

impl DraftEnvelope {
    pub fn new(values: FormState) -> Self {
        Self {
            schema_version: DRAFT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            values,
        }
    }

    /// Envelopes written by a newer library version are not trusted.
    pub fn is_supported(&self) -> bool {
        self.schema_version <= DRAFT_SCHEMA_VERSION
    }
}

/// Key-value persistence for drafts. `load` returns `Ok(None)` for a
/// missing draft and `Err` for an unreadable one; the fallback policy
/// lives in [`resume`], not in the stores.
pub trait DraftStore {
    fn save(&self, key: &str, draft: &DraftEnvelope) -> DraftResult<()>;

    fn load(&self, key: &str) -> DraftResult<Option<DraftEnvelope>>;

    fn clear(&self, key: &str) -> DraftResult<()>;

    fn list(&self) -> DraftResult<Vec<String>>;
}

/// Loads the draft stored under `key`, falling back to the seed silently
/// when the draft is missing, unreadable, or from a newer schema. Drafted
/// values are merged over the seed so fields introduced after the draft was
/// written keep their defaults.
pub fn resume(store: &dyn DraftStore, key: &str, seed: &FormState) -> FormState {
    match store.load(key) {
        Ok(Some(envelope)) if envelope.is_supported() => {
            let mut state = seed.clone();
            for (field, value) in envelope.values.iter() {
                state.set(field, value.clone());
            }
            debug!("resumed draft `{}` saved at {}", key, envelope.saved_at);
            state
        }
        Ok(Some(envelope)) => {
            debug!(
                "draft `{}` uses schema {} which is newer than {}; using seed",
                key, envelope.schema_version, DRAFT_SCHEMA_VERSION
            );
            seed.clone()
        }
        Ok(None) => seed.clone(),
        Err(err) => {
            debug!("discarding unreadable draft `{}`: {}", key, err);
            seed.clone()
        }
    }
}
