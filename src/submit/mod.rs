//! The terminal submission seam.

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub type SubmitResult<T> = Result<T, SubmitError>;

/// Failure reported by the submission collaborator. The message is shown to
/// the user verbatim, so collaborators should keep it human-readable.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Rejected(String),
    #[error("Submission backend unavailable: {0}")]
    Unavailable(String),
}

/// Whether the terminal call creates a new record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Create,
    Update(Uuid),
}

/// External persistence for completed records.
///
/// The record is an opaque JSON value already mapped to the collaborator's
/// schema; the engine issues exactly one call per submission attempt and
/// never retries on its own.
pub trait SubmitBackend {
    fn create(&self, record: &Value) -> SubmitResult<Uuid>;

    fn update(&self, id: Uuid, record: &Value) -> SubmitResult<()>;
}
