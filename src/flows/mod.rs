//! Ready-made wizard flows: dealer onboarding and campaign creation.

pub mod campaign;
pub mod dealer;

pub use campaign::{CampaignFlow, CampaignLaunch, CampaignRecord};
pub use dealer::{DealerFlow, DealerRecord, DealerTemplate, DuplicateMatch};

use crate::schema::FieldError;
use crate::state::FormState;

/// Reads a key the descriptor already guarantees, collecting an error
/// instead of panicking when the state was assembled outside a session.
pub(crate) fn required_text(
    state: &FormState,
    key: &'static str,
    errors: &mut Vec<FieldError>,
) -> String {
    match state.text(key) {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => {
            errors.push(FieldError::new(key, "Value is required"));
            String::new()
        }
    }
}

/// Blank optionals collapse to `None` so they can be omitted from records.
pub(crate) fn optional_text(state: &FormState, key: &str) -> Option<String> {
    state
        .text(key)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub(crate) fn owned(options: &[&str]) -> Vec<String> {
    options.iter().map(|option| option.to_string()).collect()
}
