use thiserror::Error;

use crate::draft::DraftError;
use crate::lookup::LookupError;
use crate::schema::ValidationFailure;
use crate::submit::SubmitError;

pub type WizardResult<T> = Result<T, WizardError>;

/// Error type that captures every recoverable wizard failure.
///
/// Each variant maps to one class of the taxonomy: field validation,
/// option lookup, record submission, and draft persistence. None of them
/// should terminate the hosting application; they all leave the session in
/// a state the user can recover from.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Session is no longer editable")]
    NotEditing,
    #[error("Submission is only offered from the final step")]
    NotAtTerminal,
}
