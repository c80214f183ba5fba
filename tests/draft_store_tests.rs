mod common;

use std::fs;
use std::sync::Arc;

use chrono::Utc;
use common::{temp_draft_store, ContactFlow, RecordingSubmit};
use wizard_core::draft::{
    DraftEnvelope, DraftStore, MemoryDraftStore, DRAFT_SCHEMA_VERSION,
};
use wizard_core::session::{SubmitOutcome, WizardFlow};
use wizard_core::state::{FormPatch, FormState};

const DRAFT_KEY: &str = "contact_draft";

#[test]
fn sessions_autosave_and_resume_across_restarts() {
    let store = Arc::new(temp_draft_store());
    let flow = ContactFlow::create();

    let mut session = flow.open().with_draft(store.clone(), DRAFT_KEY);
    session.apply(FormPatch::new().set("name", "Ramesh Patil"));
    session.advance();
    session.apply(FormPatch::new().set("phone", "9822000110"));
    drop(session);

    let resumed = flow.open().with_draft(store.clone(), DRAFT_KEY);
    assert_eq!(resumed.state().text("name"), Some("Ramesh Patil"));
    assert_eq!(resumed.state().text("phone"), Some("9822000110"));
    assert_eq!(resumed.state().text("country"), Some("India"));
    assert!(!resumed.is_dirty());
}

#[test]
fn corrupt_drafts_fall_back_to_the_seed() {
    let store = Arc::new(temp_draft_store());
    fs::write(store.root().join(format!("{}.json", DRAFT_KEY)), "{not json").unwrap();

    let flow = ContactFlow::create();
    let mut session = flow.open().with_draft(store.clone(), DRAFT_KEY);
    assert_eq!(session.state(), &flow.seed());

    // The next edit overwrites the corrupt file with a readable draft.
    session.apply(FormPatch::new().set("name", "Ramesh Patil"));
    let envelope = store.load(DRAFT_KEY).unwrap().unwrap();
    assert_eq!(envelope.values.text("name"), Some("Ramesh Patil"));
}

#[test]
fn successful_submission_clears_the_draft() {
    let store = Arc::new(temp_draft_store());
    let flow = ContactFlow::create();
    let mut session = flow.open().with_draft(store.clone(), DRAFT_KEY);

    session.apply(FormPatch::new().set("name", "Ramesh Patil"));
    session.advance();
    session.apply(FormPatch::new().set("phone", "9822000110"));
    session.advance();
    assert!(store.load(DRAFT_KEY).unwrap().is_some());

    let backend = RecordingSubmit::accepting();
    let outcome = session.submit_with(&flow, &backend).unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert!(store.load(DRAFT_KEY).unwrap().is_none());
}

#[test]
fn failed_submission_keeps_the_draft() {
    let store = Arc::new(temp_draft_store());
    let flow = ContactFlow::create();
    let mut session = flow.open().with_draft(store.clone(), DRAFT_KEY);

    session.apply(FormPatch::new().set("name", "Ramesh Patil"));
    session.advance();
    session.apply(FormPatch::new().set("phone", "9822000110"));
    session.advance();

    let backend = RecordingSubmit::rejecting_times(1, "service unavailable");
    let outcome = session.submit_with(&flow, &backend).unwrap();
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    let envelope = store.load(DRAFT_KEY).unwrap().unwrap();
    assert_eq!(envelope.values.text("phone"), Some("9822000110"));
}

#[test]
fn closing_keeps_the_draft_for_later_resume() {
    let store = Arc::new(temp_draft_store());
    let flow = ContactFlow::create();
    let mut session = flow.open().with_draft(store.clone(), DRAFT_KEY);

    session.apply(FormPatch::new().set("name", "Ramesh Patil"));
    session.close_discarding();

    let envelope = store.load(DRAFT_KEY).unwrap().unwrap();
    assert_eq!(envelope.values.text("name"), Some("Ramesh Patil"));
}

#[test]
fn envelopes_round_trip_their_metadata() {
    let store = temp_draft_store();
    let mut values = FormState::new();
    values.set("business_name", "Shetkari Agro");
    store.save("dealer", &DraftEnvelope::new(values)).unwrap();

    let loaded = store.load("dealer").unwrap().unwrap();
    assert_eq!(loaded.schema_version, DRAFT_SCHEMA_VERSION);
    assert!(loaded.saved_at <= Utc::now());
    assert_eq!(loaded.values.text("business_name"), Some("Shetkari Agro"));
}

fn exercise_store_contract(store: &dyn DraftStore) {
    let mut values = FormState::new();
    values.set("name", "Ramesh Patil");
    store.save("alpha", &DraftEnvelope::new(values.clone())).unwrap();
    store.save("zeta", &DraftEnvelope::new(values)).unwrap();

    assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    assert!(store.load("alpha").unwrap().is_some());
    assert!(store.load("missing").unwrap().is_none());

    store.clear("alpha").unwrap();
    store.clear("alpha").unwrap();
    assert!(store.load("alpha").unwrap().is_none());
    assert_eq!(store.list().unwrap(), vec!["zeta"]);
}

#[test]
fn both_store_backends_honor_the_same_contract() {
    exercise_store_contract(&temp_draft_store());
    exercise_store_contract(&MemoryDraftStore::new());
}
