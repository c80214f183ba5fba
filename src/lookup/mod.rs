//! Option lookups feeding choice-driven steps.

pub mod choice;

pub use choice::ChoiceMapper;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::FieldValue;

pub type LookupResult<T> = Result<T, LookupError>;

/// Failure while fetching an option list. Callers degrade to an empty list
/// rather than surfacing this to the user.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup `{kind}` failed: {message}")]
    Failed { kind: String, message: String },
}

impl LookupError {
    pub fn failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        LookupError::Failed {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// One selectable option for a step.
///
/// `data` carries an optional payload the flow may use beyond display, such
/// as the subject and body a content template prefills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FieldValue>,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            note: None,
            data: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_data(mut self, data: FieldValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// External source of selectable options, keyed by a step-defined kind
/// (for example `"segments"` or `"templates"`). One call per need; the
/// engine imposes no caching or invalidation contract.
pub trait LookupBackend {
    fn fetch(&self, kind: &str) -> LookupResult<Vec<Choice>>;
}
