use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::draft::{self, DraftEnvelope, DraftStore};
use crate::errors::{WizardError, WizardResult};
use crate::lookup::{Choice, LookupBackend, LookupResult};
use crate::schema::{FieldError, WizardDescriptor};
use crate::state::{FormPatch, FormState};
use crate::submit::{SubmitAction, SubmitBackend, SubmitResult};

use super::WizardFlow;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Submitting,
    Closed,
}

/// Outcome of a navigation call. Blocked transitions carry the field
/// errors; clamped or out-of-policy moves are plain no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Moved(usize),
    Blocked(crate::schema::ValidationFailure),
    NoOp,
}

/// Outcome of completing a lookup ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketOutcome {
    Applied,
    Degraded,
    Stale,
}

/// Outcome of completing a submission ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Uuid),
    Failed(String),
    Stale,
}

/// Result of asking the session to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    ConfirmDiscard,
}

/// Claim on an in-flight option fetch. Completions presented with a ticket
/// from a previous generation are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    kind: String,
    generation: u64,
}

impl LookupTicket {
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Claim on an in-flight submission, carrying the mapped payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    generation: u64,
    action: SubmitAction,
    payload: Value,
}

impl SubmitTicket {
    pub fn action(&self) -> SubmitAction {
        self.action
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

struct DraftBinding {
    store: Arc<dyn DraftStore>,
    key: String,
}

/// A live wizard session: one open dialog's accumulated state, step
/// position, and in-flight work.
///
/// All mutation is synchronous; asynchronous collaborator calls are split
/// into `begin_*` / `complete_*` pairs so the host may suspend however it
/// likes. Discarding events (reset, close, successful submit) bump the
/// generation counter, turning completions of superseded work into no-ops.
pub struct WizardSession {
    descriptor: Arc<WizardDescriptor>,
    seed: FormState,
    state: FormState,
    index: usize,
    reached: usize,
    phase: SessionPhase,
    dirty: bool,
    generation: u64,
    errors: Vec<FieldError>,
    notice: Option<String>,
    option_lists: BTreeMap<String, Vec<Choice>>,
    draft: Option<DraftBinding>,
}

impl WizardSession {
    pub fn new(descriptor: Arc<WizardDescriptor>, seed: FormState) -> Self {
        Self {
            descriptor,
            state: seed.clone(),
            seed,
            index: 0,
            reached: 0,
            phase: SessionPhase::Editing,
            dirty: false,
            generation: 0,
            errors: Vec::new(),
            notice: None,
            option_lists: BTreeMap::new(),
            draft: None,
        }
    }

    /// Binds a draft store and resumes any persisted draft over the seed.
    /// Meant to be called right after construction; resuming does not mark
    /// the session dirty.
    pub fn with_draft(mut self, store: Arc<dyn DraftStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        self.state = draft::resume(store.as_ref(), &key, &self.seed);
        self.draft = Some(DraftBinding { store, key });
        self
    }

    pub fn descriptor(&self) -> &WizardDescriptor {
        &self.descriptor
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn reached_index(&self) -> usize {
        self.reached
    }

    pub fn is_terminal(&self) -> bool {
        self.index == self.descriptor.terminal_index()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Field errors from the most recent blocked transition or submission
    /// attempt, for inline display.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The one-shot notification from the last failed submission, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Share of required fields currently filled, as a whole percentage.
    pub fn progress(&self) -> u8 {
        let required = self.descriptor.required_keys();
        if required.is_empty() {
            return 100;
        }
        let filled = required
            .iter()
            .filter(|key| !self.state.is_blank(key))
            .count();
        ((filled * 100 + required.len() / 2) / required.len()) as u8
    }

    /// Shallow-merges a patch into the form state. Ignored outside the
    /// editing phase. Inline errors for the touched fields are dropped and
    /// the draft, when bound, is rewritten.
    pub fn apply(&mut self, patch: FormPatch) {
        if self.phase != SessionPhase::Editing || patch.is_empty() {
            return;
        }
        let touched: Vec<String> = patch.keys().map(str::to_string).collect();
        self.state.apply(patch);
        self.after_edit(&touched);
    }

    /// Merges a patch one level deep into the record under `key`,
    /// preserving its sibling entries.
    pub fn apply_nested(&mut self, key: &str, patch: FormPatch) {
        if self.phase != SessionPhase::Editing || patch.is_empty() {
            return;
        }
        self.state.apply_nested(key, patch);
        self.after_edit(&[key.to_string()]);
    }

    fn after_edit(&mut self, touched: &[String]) {
        self.errors
            .retain(|error| !touched.iter().any(|key| *key == error.field));
        self.notice = None;
        self.dirty = true;
        self.autosave();
    }

    /// Moves to the next step if the active step validates. Clamped at the
    /// terminal step.
    pub fn advance(&mut self) -> StepEvent {
        if self.phase != SessionPhase::Editing {
            return StepEvent::NoOp;
        }
        let descriptor = Arc::clone(&self.descriptor);
        let Some(step) = descriptor.step(self.index) else {
            return StepEvent::NoOp;
        };
        match step.validate(&mut self.state) {
            Err(failure) => {
                self.errors = failure.errors.clone();
                StepEvent::Blocked(failure)
            }
            Ok(()) => {
                self.errors.clear();
                self.autosave();
                if self.index >= descriptor.terminal_index() {
                    StepEvent::NoOp
                } else {
                    self.index += 1;
                    self.reached = self.reached.max(self.index);
                    StepEvent::Moved(self.index)
                }
            }
        }
    }

    /// Moves to the previous step. Never validates; clamped at step 0.
    pub fn retreat(&mut self) -> StepEvent {
        if self.phase != SessionPhase::Editing || self.index == 0 {
            return StepEvent::NoOp;
        }
        self.index -= 1;
        self.errors.clear();
        StepEvent::Moved(self.index)
    }

    /// Jumps directly to a step already reached. Jumps ahead of the highest
    /// reached step are refused so no step is skipped unvalidated.
    pub fn go_to(&mut self, index: usize) -> StepEvent {
        if self.phase != SessionPhase::Editing || index == self.index {
            return StepEvent::NoOp;
        }
        if index > self.reached || index >= self.descriptor.len() {
            return StepEvent::NoOp;
        }
        self.index = index;
        self.errors.clear();
        StepEvent::Moved(index)
    }

    /// Issues a claim for an option fetch of `kind`.
    pub fn begin_lookup(&mut self, kind: impl Into<String>) -> LookupTicket {
        LookupTicket {
            kind: kind.into(),
            generation: self.generation,
        }
    }

    /// Applies a finished lookup. Failures degrade to an empty option list
    /// and are logged, never surfaced; stale tickets are ignored.
    pub fn complete_lookup(
        &mut self,
        ticket: LookupTicket,
        result: LookupResult<Vec<Choice>>,
    ) -> TicketOutcome {
        if ticket.generation != self.generation || self.phase == SessionPhase::Closed {
            debug!("ignoring stale lookup `{}`", ticket.kind);
            return TicketOutcome::Stale;
        }
        match result {
            Ok(choices) => {
                self.option_lists.insert(ticket.kind, choices);
                TicketOutcome::Applied
            }
            Err(err) => {
                warn!("lookup `{}` degraded to an empty option list: {}", ticket.kind, err);
                self.option_lists.insert(ticket.kind, Vec::new());
                TicketOutcome::Degraded
            }
        }
    }

    /// Options last fetched for `kind`; empty until a lookup completes.
    pub fn options(&self, kind: &str) -> &[Choice] {
        self.option_lists
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Runs a lookup inline against a collaborator.
    pub fn lookup_with(&mut self, backend: &dyn LookupBackend, kind: &str) -> &[Choice] {
        let ticket = self.begin_lookup(kind);
        let result = backend.fetch(kind);
        self.complete_lookup(ticket, result);
        self.options(kind)
    }

    /// Validates the whole registry, maps the record, and moves the session
    /// into the submitting phase. Only offered from the terminal step.
    pub fn begin_submit<F: WizardFlow>(&mut self, flow: &F) -> WizardResult<SubmitTicket> {
        if self.phase != SessionPhase::Editing {
            return Err(WizardError::NotEditing);
        }
        if !self.is_terminal() {
            return Err(WizardError::NotAtTerminal);
        }
        self.notice = None;
        let descriptor = Arc::clone(&self.descriptor);
        if let Err(failure) = descriptor.validate_all(&mut self.state) {
            self.errors = failure.errors.clone();
            return Err(WizardError::Validation(failure));
        }
        self.errors.clear();
        self.autosave();
        let record = flow.commit(&self.state).map_err(|failure| {
            self.errors = failure.errors.clone();
            WizardError::Validation(failure)
        })?;
        let payload = serde_json::to_value(record)?;
        self.phase = SessionPhase::Submitting;
        debug!("wizard `{}` entering submission", self.descriptor.name);
        Ok(SubmitTicket {
            generation: self.generation,
            action: flow.action(),
            payload,
        })
    }

    /// Applies the collaborator's verdict. Success resets to the seed,
    /// clears the draft, and closes; failure returns to editing with the
    /// state untouched so the user may retry.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: SubmitResult<Uuid>,
    ) -> SubmitOutcome {
        if ticket.generation != self.generation || self.phase != SessionPhase::Submitting {
            debug!(
                "ignoring stale submission result for wizard `{}`",
                self.descriptor.name
            );
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(id) => {
                self.clear_draft();
                self.state = self.seed.clone();
                self.index = 0;
                self.reached = 0;
                self.dirty = false;
                self.errors.clear();
                self.notice = None;
                self.generation += 1;
                self.phase = SessionPhase::Closed;
                info!("wizard `{}` submitted record {}", self.descriptor.name, id);
                SubmitOutcome::Completed(id)
            }
            Err(err) => {
                let message = err.to_string();
                warn!("wizard `{}` submission failed: {}", self.descriptor.name, message);
                self.notice = Some(message.clone());
                self.phase = SessionPhase::Editing;
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Runs the whole submission inline against a collaborator.
    pub fn submit_with<F: WizardFlow>(
        &mut self,
        flow: &F,
        backend: &dyn SubmitBackend,
    ) -> WizardResult<SubmitOutcome> {
        let ticket = self.begin_submit(flow)?;
        let result = match ticket.action() {
            SubmitAction::Create => backend.create(ticket.payload()),
            SubmitAction::Update(id) => backend.update(id, ticket.payload()).map(|_| id),
        };
        Ok(self.complete_submit(ticket, result))
    }

    /// Requests closing. A dirty session asks for confirmation instead of
    /// closing; answer it with [`WizardSession::close_discarding`]. The
    /// draft, when bound, stays put so the session can be resumed later.
    pub fn close(&mut self) -> CloseOutcome {
        if self.phase == SessionPhase::Closed {
            return CloseOutcome::Closed;
        }
        if self.dirty {
            return CloseOutcome::ConfirmDiscard;
        }
        self.discard();
        CloseOutcome::Closed
    }

    /// Closes unconditionally, discarding unsaved edits.
    pub fn close_discarding(&mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        self.phase = SessionPhase::Closed;
        self.generation += 1;
    }

    /// Returns the session to a fresh editing state on the seed defaults.
    pub fn reset(&mut self) {
        self.state = self.seed.clone();
        self.index = 0;
        self.reached = 0;
        self.errors.clear();
        self.notice = None;
        self.dirty = false;
        self.generation += 1;
        self.phase = SessionPhase::Editing;
        self.autosave();
    }

    fn autosave(&self) {
        if let Some(binding) = &self.draft {
            let envelope = DraftEnvelope::new(self.state.clone());
            if let Err(err) = binding.store.save(&binding.key, &envelope) {
                warn!("failed to save draft `{}`: {}", binding.key, err);
            }
        }
    }

    fn clear_draft(&self) {
        if let Some(binding) = &self.draft {
            if let Err(err) = binding.store.clear(&binding.key) {
                warn!("failed to clear draft `{}`: {}", binding.key, err);
            }
        }
    }
}
