//! The wizard session state machine and the flow contract it drives.

pub mod session;

pub use session::{
    CloseOutcome, LookupTicket, SessionPhase, StepEvent, SubmitOutcome, SubmitTicket,
    TicketOutcome, WizardSession,
};

use std::sync::Arc;

use serde::Serialize;

use crate::schema::{ValidationFailure, WizardDescriptor};
use crate::state::FormState;
use crate::submit::SubmitAction;

/// A concrete wizard: its step registry, seed defaults, and the terminal
/// translation from accumulated state to the record the submission
/// collaborator expects.
///
/// `commit` performs the field mapping (renames, coercions, omission of
/// blanks) and runs only after the registry-wide validation has passed, so
/// implementations may rely on required fields being present.
pub trait WizardFlow {
    type Record: Serialize;

    fn descriptor(&self) -> Arc<WizardDescriptor>;

    fn seed(&self) -> FormState;

    fn action(&self) -> SubmitAction {
        SubmitAction::Create
    }

    fn commit(&self, state: &FormState) -> Result<Self::Record, ValidationFailure>;

    /// Opens a fresh session for this flow.
    fn open(&self) -> WizardSession {
        WizardSession::new(self.descriptor(), self.seed())
    }
}
