//! Campaign creation: basic details, audience targeting, message content,
//! and scheduling, saved as a draft or scheduled for launch.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::lookup::Choice;
use crate::schema::{
    FieldDescriptor, FieldError, FieldKind, StepCheck, StepDescriptor, ValidationFailure,
    Validator, WizardDescriptor,
};
use crate::session::{WizardFlow, WizardSession};
use crate::state::{FieldValue, FormPatch, FormState};

use super::{optional_text, owned, required_text};

/// Fixed key the campaign wizard persists its draft under.
pub const CAMPAIGN_DRAFT_KEY: &str = "campaign_wizard_draft";

/// Lookup kind resolving the tenant's audience segments.
pub const SEGMENTS_LOOKUP: &str = "segments";

/// Lookup kind resolving reusable message templates.
pub const TEMPLATES_LOOKUP: &str = "templates";

pub const CHANNELS: [&str; 4] = ["sms", "whatsapp", "app", "email"];
pub const CAMPAIGN_TYPES: [&str; 3] = ["promotional", "educational", "seasonal"];
pub const CRITERIA_OPERATORS: [&str; 5] =
    ["equals", "not_equals", "contains", "greater_than", "less_than"];
pub const CRITERIA_LOGIC: [&str; 2] = ["and", "or"];

static DESCRIPTOR: Lazy<Arc<WizardDescriptor>> = Lazy::new(|| Arc::new(build_descriptor()));

fn build_descriptor() -> WizardDescriptor {
    WizardDescriptor::new(
        "campaign_wizard",
        vec![
            StepDescriptor::new("basic", "Campaign Basics").with_fields(vec![
                FieldDescriptor::new("name", "Campaign name", FieldKind::Text, Validator::NonEmpty),
                FieldDescriptor::new(
                    "description",
                    "Description",
                    FieldKind::Text,
                    make_description_validator(500),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "campaign_type",
                    "Campaign type",
                    FieldKind::Choice(owned(&CAMPAIGN_TYPES)),
                    Validator::None,
                ),
                FieldDescriptor::new(
                    "channels",
                    "Channels",
                    FieldKind::MultiChoice(owned(&CHANNELS)),
                    Validator::None,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "total_budget",
                    "Total budget",
                    FieldKind::Decimal,
                    Validator::NonNegativeNumber,
                )
                .with_optional(),
            ]),
            StepDescriptor::new("audience", "Target Audience"),
            StepDescriptor::new("content", "Message Content"),
            StepDescriptor::new("schedule", "Schedule").with_check(make_schedule_check()),
            StepDescriptor::new("review", "Review & Launch"),
        ],
    )
}

fn make_description_validator(max_len: usize) -> Validator {
    Validator::Custom(Arc::new(move |value| match value.as_text() {
        Some(text) if text.trim().chars().count() <= max_len => Ok(FieldValue::text(text.trim())),
        Some(_) => Err(format!("Keep the description under {} characters", max_len)),
        None => Err("Enter text".into()),
    }))
}

fn schedule_day(
    schedule: &BTreeMap<String, FieldValue>,
    key: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let text = schedule
        .get(key)
        .and_then(FieldValue::as_text)
        .map(str::trim)
        .filter(|text| !text.is_empty())?;
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(_) => {
            errors.push(FieldError::new(
                "schedule",
                format!("{} must use YYYY-MM-DD format", label),
            ));
            None
        }
    }
}

fn make_schedule_check() -> StepCheck {
    Arc::new(|state: &FormState| {
        let empty = BTreeMap::new();
        let schedule = state.record("schedule").unwrap_or(&empty);
        let mut errors = Vec::new();
        let start = schedule_day(schedule, "start_date", "Start date", &mut errors);
        let end = schedule_day(schedule, "end_date", "End date", &mut errors);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push(FieldError::new(
                    "schedule",
                    "End date must not precede the start date",
                ));
            }
        }
        let automated = schedule
            .get("is_automated")
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);
        if automated && start.is_none() && errors.is_empty() {
            errors.push(FieldError::new(
                "schedule",
                "Automated campaigns need a start date",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    })
}

/// Whether the finished campaign is parked as a draft or queued to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignLaunch {
    Draft,
    Scheduled,
}

impl CampaignLaunch {
    /// The status string the campaign store expects.
    pub fn status(&self) -> &'static str {
        match self {
            CampaignLaunch::Draft => "draft",
            CampaignLaunch::Scheduled => "scheduled",
        }
    }
}

/// The campaign record as the persistence collaborator expects it. The
/// wizard's `total_budget` travels as `budget_allocated`, and the nested
/// sub-records become JSON config objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub campaign_type: String,
    pub status: &'static str,
    pub channels: Vec<String>,
    pub budget_allocated: f64,
    pub target_audience_config: Value,
    pub content_config: Value,
    pub automation_config: Value,
}

/// The campaign creation flow for one tenant.
pub struct CampaignFlow {
    tenant: Option<Uuid>,
    launch: CampaignLaunch,
}

impl CampaignFlow {
    /// A wizard that saves the campaign as an editable draft.
    pub fn draft() -> Self {
        Self {
            tenant: None,
            launch: CampaignLaunch::Draft,
        }
    }

    /// A wizard that schedules the campaign on submission.
    pub fn scheduled() -> Self {
        Self {
            tenant: None,
            launch: CampaignLaunch::Scheduled,
        }
    }

    pub fn for_tenant(mut self, tenant: Uuid) -> Self {
        self.tenant = Some(tenant);
        self
    }

    /// Replaces the selected audience segments, leaving criteria untouched.
    pub fn select_segments<I, S>(session: &mut WizardSession, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        session.apply_nested(
            "target_audience",
            FormPatch::new().set("segments", FieldValue::list(ids)),
        );
    }

    /// Prefills the content step from a template choice. Only the keys the
    /// template carries are overwritten.
    pub fn apply_template(session: &mut WizardSession, template: &Choice) {
        let mut patch = FormPatch::new().set("template_id", template.id.clone());
        if let Some(FieldValue::Record(entries)) = &template.data {
            for key in ["subject", "body"] {
                if let Some(FieldValue::Text(text)) = entries.get(key) {
                    patch = patch.set(key, text.clone());
                }
            }
        }
        session.apply_nested("content", patch);
    }

    /// Adds or replaces one targeting criterion, keyed by the audience
    /// field it filters on.
    pub fn add_criterion(
        session: &mut WizardSession,
        field: &str,
        operator: &str,
        value: impl Into<FieldValue>,
        logic: &str,
    ) -> Result<(), ValidationFailure> {
        if !CRITERIA_OPERATORS.contains(&operator) {
            return Err(ValidationFailure::single(
                "target_audience",
                format!(
                    "Unknown operator `{}`; use one of: {}",
                    operator,
                    CRITERIA_OPERATORS.join(", ")
                ),
            ));
        }
        if !CRITERIA_LOGIC.contains(&logic) {
            return Err(ValidationFailure::single(
                "target_audience",
                format!("Unknown logic `{}`; use `and` or `or`", logic),
            ));
        }
        let mut criteria = session
            .state()
            .record("target_audience")
            .and_then(|audience| audience.get("criteria"))
            .and_then(FieldValue::as_record)
            .cloned()
            .unwrap_or_default();
        criteria.insert(
            field.to_string(),
            FieldValue::record([
                ("operator", FieldValue::text(operator)),
                ("value", value.into()),
                ("logic", FieldValue::text(logic)),
            ]),
        );
        session.apply_nested(
            "target_audience",
            FormPatch::new().set("criteria", FieldValue::Record(criteria)),
        );
        Ok(())
    }
}

fn config_json(state: &FormState, key: &str) -> Value {
    state
        .get(key)
        .map(FieldValue::to_json)
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
}

impl WizardFlow for CampaignFlow {
    type Record = CampaignRecord;

    fn descriptor(&self) -> Arc<WizardDescriptor> {
        Arc::clone(&DESCRIPTOR)
    }

    fn seed(&self) -> FormState {
        let mut state = FormState::new();
        state.set("name", "");
        state.set("description", "");
        state.set("campaign_type", "promotional");
        state.set("channels", FieldValue::List(Vec::new()));
        state.set("total_budget", 0i64);
        state.apply_nested(
            "target_audience",
            FormPatch::new()
                .set("segments", FieldValue::List(Vec::new()))
                .set("criteria", FieldValue::Record(BTreeMap::new())),
        );
        state.apply_nested(
            "content",
            FormPatch::new()
                .set("template_id", "")
                .set("subject", "")
                .set("body", "")
                .set("personalization", FieldValue::Record(BTreeMap::new())),
        );
        state.apply_nested(
            "schedule",
            FormPatch::new()
                .set("start_date", "")
                .set("end_date", "")
                .set("timezone", "UTC")
                .set("is_automated", false),
        );
        state
    }

    fn commit(&self, state: &FormState) -> Result<CampaignRecord, ValidationFailure> {
        let mut errors = Vec::new();
        let name = required_text(state, "name", &mut errors);
        let campaign_type = required_text(state, "campaign_type", &mut errors);
        if !errors.is_empty() {
            return Err(ValidationFailure::new(errors));
        }
        Ok(CampaignRecord {
            tenant_id: self.tenant,
            name,
            description: optional_text(state, "description"),
            campaign_type,
            status: self.launch.status(),
            channels: state.list("channels").map(<[String]>::to_vec).unwrap_or_default(),
            budget_allocated: state.decimal("total_budget").unwrap_or(0.0),
            target_audience_config: config_json(state, "target_audience"),
            content_config: config_json(state, "content"),
            automation_config: config_json(state, "schedule"),
        })
    }
}
