#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use uuid::Uuid;

use wizard_core::draft::JsonDraftStore;
use wizard_core::lookup::{Choice, LookupBackend, LookupError, LookupResult};
use wizard_core::schema::{
    FieldDescriptor, FieldKind, StepDescriptor, ValidationFailure, Validator, WizardDescriptor,
};
use wizard_core::session::WizardFlow;
use wizard_core::state::{FormPatch, FormState};
use wizard_core::submit::{SubmitAction, SubmitBackend, SubmitError, SubmitResult};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a draft store backed by a unique temporary directory.
pub fn temp_draft_store() -> JsonDraftStore {
    let temp = TempDir::new().expect("create temp dir");
    let root = temp.path().join("drafts");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    JsonDraftStore::new(Some(root)).expect("create json draft store")
}

#[derive(Debug, Serialize)]
pub struct ContactRecord {
    pub name: String,
    pub phone: String,
    pub country: String,
}

/// Minimal three-step flow exercising navigation, drafts, and submission
/// without the bulk of the shipped flows.
pub struct ContactFlow {
    action: SubmitAction,
}

impl ContactFlow {
    pub fn create() -> Self {
        Self {
            action: SubmitAction::Create,
        }
    }

    pub fn edit(id: Uuid) -> Self {
        Self {
            action: SubmitAction::Update(id),
        }
    }
}

static CONTACT_DESCRIPTOR: Lazy<Arc<WizardDescriptor>> = Lazy::new(|| {
    Arc::new(WizardDescriptor::new(
        "contact_wizard",
        vec![
            StepDescriptor::new("basic", "Basic").with_fields(vec![FieldDescriptor::new(
                "name",
                "Name",
                FieldKind::Text,
                Validator::NonEmpty,
            )]),
            StepDescriptor::new("contact", "Contact").with_fields(vec![
                FieldDescriptor::new("phone", "Phone", FieldKind::Text, Validator::NonEmpty),
                FieldDescriptor::new("email", "Email", FieldKind::Text, Validator::Email)
                    .with_optional(),
            ]),
            StepDescriptor::new("review", "Review"),
        ],
    ))
});

impl WizardFlow for ContactFlow {
    type Record = ContactRecord;

    fn descriptor(&self) -> Arc<WizardDescriptor> {
        Arc::clone(&CONTACT_DESCRIPTOR)
    }

    fn seed(&self) -> FormState {
        FormState::seeded(FormPatch::new().set("country", "India"))
    }

    fn action(&self) -> SubmitAction {
        self.action
    }

    fn commit(&self, state: &FormState) -> Result<ContactRecord, ValidationFailure> {
        let name = state.text("name").unwrap_or_default().trim().to_string();
        let phone = state.text("phone").unwrap_or_default().trim().to_string();
        if name.is_empty() || phone.is_empty() {
            return Err(ValidationFailure::single(
                "name",
                "Complete the wizard before submitting",
            ));
        }
        Ok(ContactRecord {
            name,
            phone,
            country: state.text("country").unwrap_or_default().to_string(),
        })
    }
}

/// Lookup collaborator returning canned option lists; listed kinds fail.
#[derive(Default)]
pub struct StaticLookup {
    lists: BTreeMap<String, Vec<Choice>>,
    failing: Vec<String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, kind: &str, choices: Vec<Choice>) -> Self {
        self.lists.insert(kind.to_string(), choices);
        self
    }

    pub fn with_failure(mut self, kind: &str) -> Self {
        self.failing.push(kind.to_string());
        self
    }
}

impl LookupBackend for StaticLookup {
    fn fetch(&self, kind: &str) -> LookupResult<Vec<Choice>> {
        if self.failing.iter().any(|failing| failing == kind) {
            return Err(LookupError::failed(kind, "backend unavailable"));
        }
        Ok(self.lists.get(kind).cloned().unwrap_or_default())
    }
}

/// Submit collaborator recording every accepted payload. The first
/// `failures` calls are rejected with `message`, then calls succeed.
pub struct RecordingSubmit {
    created: Mutex<Vec<Value>>,
    updated: Mutex<Vec<(Uuid, Value)>>,
    failures: Mutex<usize>,
    message: String,
}

impl RecordingSubmit {
    pub fn accepting() -> Self {
        Self::rejecting_times(0, "")
    }

    pub fn rejecting_times(failures: usize, message: &str) -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            failures: Mutex::new(failures),
            message: message.to_string(),
        }
    }

    fn take_failure(&self) -> bool {
        let mut left = self.failures.lock().expect("lock failure budget");
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    }

    pub fn created(&self) -> Vec<Value> {
        self.created.lock().expect("lock created payloads").clone()
    }

    pub fn last_created(&self) -> Option<Value> {
        self.created().last().cloned()
    }

    pub fn updated(&self) -> Vec<(Uuid, Value)> {
        self.updated.lock().expect("lock updated payloads").clone()
    }
}

impl SubmitBackend for RecordingSubmit {
    fn create(&self, record: &Value) -> SubmitResult<Uuid> {
        if self.take_failure() {
            return Err(SubmitError::Rejected(self.message.clone()));
        }
        self.created
            .lock()
            .expect("lock created payloads")
            .push(record.clone());
        Ok(Uuid::new_v4())
    }

    fn update(&self, id: Uuid, record: &Value) -> SubmitResult<()> {
        if self.take_failure() {
            return Err(SubmitError::Rejected(self.message.clone()));
        }
        self.updated
            .lock()
            .expect("lock updated payloads")
            .push((id, record.clone()));
        Ok(())
    }
}
