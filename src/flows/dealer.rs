//! Dealer onboarding: six steps from business profile to review, with the
//! Indian-market checks the dealer network requires.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use strsim::jaro_winkler;
use uuid::Uuid;

use crate::schema::{
    FieldDescriptor, FieldKind, StepDescriptor, ValidationFailure, Validator, WizardDescriptor,
};
use crate::session::WizardFlow;
use crate::state::{FieldValue, FormPatch, FormState};
use crate::submit::SubmitAction;

use super::{optional_text, owned, required_text};

/// Fixed key the dealer wizard persists its draft under.
pub const DEALER_DRAFT_KEY: &str = "dealer_form_draft";

/// Similarity above which an existing dealer name counts as a likely
/// duplicate.
pub const DUPLICATE_THRESHOLD: f64 = 0.85;

const DEALER_TYPES: [&str; 5] = ["distributor", "retailer", "wholesaler", "franchise", "agent"];
const EMPLOYEE_BANDS: [&str; 5] = ["1-10", "5-20", "10-50", "50-100", "100+"];
const TURNOVER_BANDS: [&str; 4] = [
    "10-50 Lakhs",
    "50 Lakhs - 1 Crore",
    "1-5 Crores",
    "5+ Crores",
];
const BUSINESS_CATEGORIES: [&str; 8] = [
    "seeds",
    "fertilizers",
    "pesticides",
    "machinery",
    "irrigation",
    "tools",
    "organic",
    "animal_feed",
];
const PAYMENT_TERMS: [&str; 5] = ["7", "15", "30", "45", "60"];

static DESCRIPTOR: Lazy<Arc<WizardDescriptor>> = Lazy::new(|| Arc::new(build_descriptor()));

fn build_descriptor() -> WizardDescriptor {
    WizardDescriptor::new(
        "dealer_onboarding",
        vec![
            StepDescriptor::new("basic", "Business Profile").with_fields(vec![
                FieldDescriptor::new(
                    "business_name",
                    "Business name",
                    FieldKind::Text,
                    make_min_len_validator("Business name", 3),
                ),
                FieldDescriptor::new("legal_name", "Legal name", FieldKind::Text, Validator::NonEmpty)
                    .with_optional()
                    .with_help("Defaults to the business name when left blank."),
                FieldDescriptor::new(
                    "dealer_type",
                    "Dealer type",
                    FieldKind::Choice(owned(&DEALER_TYPES)),
                    Validator::None,
                ),
                FieldDescriptor::new(
                    "registration_number",
                    "Registration number",
                    FieldKind::Text,
                    Validator::NonEmpty,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "establishment_year",
                    "Establishment year",
                    FieldKind::Integer,
                    make_year_validator(),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "employee_count",
                    "Employee count",
                    FieldKind::Choice(owned(&EMPLOYEE_BANDS)),
                    Validator::None,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "annual_turnover",
                    "Annual turnover",
                    FieldKind::Choice(owned(&TURNOVER_BANDS)),
                    Validator::None,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "business_category",
                    "Business categories",
                    FieldKind::MultiChoice(owned(&BUSINESS_CATEGORIES)),
                    Validator::None,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "contact_person",
                    "Contact person",
                    FieldKind::Text,
                    Validator::NonEmpty,
                ),
                FieldDescriptor::new(
                    "designation",
                    "Designation",
                    FieldKind::Text,
                    Validator::NonEmpty,
                )
                .with_optional(),
            ]),
            StepDescriptor::new("contact", "Contact Details").with_fields(vec![
                FieldDescriptor::new("phone", "Phone", FieldKind::Text, make_phone_validator()),
                FieldDescriptor::new("email", "Email", FieldKind::Text, Validator::Email),
                FieldDescriptor::new(
                    "alternate_phone",
                    "Alternate phone",
                    FieldKind::Text,
                    make_phone_validator(),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "alternate_email",
                    "Alternate email",
                    FieldKind::Text,
                    Validator::Email,
                )
                .with_optional(),
                FieldDescriptor::new("website", "Website", FieldKind::Text, make_url_validator())
                    .with_optional(),
            ]),
            StepDescriptor::new("address", "Address & Location").with_fields(vec![
                FieldDescriptor::new(
                    "address_line1",
                    "Address line 1",
                    FieldKind::Text,
                    make_min_len_validator("Address", 5),
                ),
                FieldDescriptor::new(
                    "address_line2",
                    "Address line 2",
                    FieldKind::Text,
                    Validator::NonEmpty,
                )
                .with_optional(),
                FieldDescriptor::new("city", "City", FieldKind::Text, Validator::NonEmpty),
                FieldDescriptor::new("state", "State", FieldKind::Text, Validator::NonEmpty),
                FieldDescriptor::new(
                    "postal_code",
                    "PIN code",
                    FieldKind::Text,
                    make_postal_validator(),
                ),
                FieldDescriptor::new("country", "Country", FieldKind::Text, Validator::NonEmpty),
                FieldDescriptor::new(
                    "gps_latitude",
                    "GPS latitude",
                    FieldKind::Decimal,
                    make_coordinate_validator("Latitude", -90.0, 90.0),
                )
                .with_optional(),
                FieldDescriptor::new(
                    "gps_longitude",
                    "GPS longitude",
                    FieldKind::Decimal,
                    make_coordinate_validator("Longitude", -180.0, 180.0),
                )
                .with_optional(),
            ]),
            StepDescriptor::new("registration", "Registration & Banking").with_fields(vec![
                FieldDescriptor::new("gst_number", "GST number", FieldKind::Text, make_gst_validator())
                    .with_optional()
                    .with_help("15-character GSTIN, e.g. 29ABCDE1234F1Z5."),
                FieldDescriptor::new("pan_number", "PAN number", FieldKind::Text, make_pan_validator())
                    .with_optional()
                    .with_help("10-character PAN, e.g. ABCDE1234F."),
                FieldDescriptor::new(
                    "license_number",
                    "License number",
                    FieldKind::Text,
                    Validator::NonEmpty,
                )
                .with_optional(),
                FieldDescriptor::new("bank_name", "Bank name", FieldKind::Text, Validator::NonEmpty)
                    .with_optional(),
                FieldDescriptor::new(
                    "bank_account_number",
                    "Account number",
                    FieldKind::Text,
                    make_account_number_validator(),
                )
                .with_optional(),
                FieldDescriptor::new("bank_ifsc", "IFSC code", FieldKind::Text, make_ifsc_validator())
                    .with_optional(),
            ]),
            StepDescriptor::new("commercial", "Commercial Terms").with_fields(vec![
                FieldDescriptor::new(
                    "credit_limit",
                    "Credit limit",
                    FieldKind::Decimal,
                    Validator::NonNegativeNumber,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "payment_terms",
                    "Payment terms (days)",
                    FieldKind::Choice(owned(&PAYMENT_TERMS)),
                    Validator::None,
                )
                .with_optional(),
                FieldDescriptor::new(
                    "commission_rate",
                    "Commission rate (%)",
                    FieldKind::Decimal,
                    make_rate_validator(),
                )
                .with_optional(),
                FieldDescriptor::new("territory", "Territory", FieldKind::Text, Validator::NonEmpty)
                    .with_optional(),
                FieldDescriptor::new("notes", "Notes", FieldKind::Text, make_notes_validator(500))
                    .with_optional(),
            ]),
            StepDescriptor::new("review", "Review & Submit"),
        ],
    )
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn make_min_len_validator(label: &'static str, min: usize) -> Validator {
    Validator::Custom(Arc::new(move |value| match value.as_text() {
        Some(text) if text.trim().chars().count() >= min => Ok(FieldValue::text(text.trim())),
        _ => Err(format!("{} must be at least {} characters", label, min)),
    }))
}

fn make_phone_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Enter a phone number".into());
        };
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        if (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(FieldValue::text(compact))
        } else {
            Err("Enter a 10 to 15 digit phone number, optionally prefixed with +".into())
        }
    }))
}

fn make_postal_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Please enter a valid 6-digit PIN code".into());
        };
        let trimmed = text.trim();
        if is_digits(trimmed, 6) {
            Ok(FieldValue::text(trimmed))
        } else {
            Err("Please enter a valid 6-digit PIN code".into())
        }
    }))
}

fn make_url_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Enter a URL starting with http:// or https://".into());
        };
        let trimmed = text.trim();
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"));
        match rest {
            Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => {
                Ok(FieldValue::text(trimmed))
            }
            _ => Err("Enter a URL starting with http:// or https://".into()),
        }
    }))
}

fn make_year_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let year = match value {
            FieldValue::Integer(year) => Some(*year),
            FieldValue::Text(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        let current = Utc::now().year() as i64;
        match year {
            Some(year) if (1900..=current).contains(&year) => Ok(FieldValue::Integer(year)),
            _ => Err(format!("Enter a year between 1900 and {}", current)),
        }
    }))
}

fn make_coordinate_validator(label: &'static str, min: f64, max: f64) -> Validator {
    Validator::Custom(Arc::new(move |value| {
        let number = match value {
            FieldValue::Decimal(number) => Some(*number),
            FieldValue::Integer(number) => Some(*number as f64),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(number) if number >= min && number <= max => Ok(FieldValue::Decimal(number)),
            _ => Err(format!("{} must be between {} and {}", label, min, max)),
        }
    }))
}

/// GSTIN layout: state code, embedded PAN, entity digit, the literal `Z`,
/// and a checksum character.
fn is_valid_gst(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.len() == 15
        && chars[0..2].iter().all(|c| c.is_ascii_digit())
        && chars[2..7].iter().all(|c| c.is_ascii_uppercase())
        && chars[7..11].iter().all(|c| c.is_ascii_digit())
        && chars[11].is_ascii_uppercase()
        && (chars[12].is_ascii_uppercase() || ('1'..='9').contains(&chars[12]))
        && chars[13] == 'Z'
        && (chars[14].is_ascii_uppercase() || chars[14].is_ascii_digit())
}

fn make_gst_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Invalid GST format (e.g., 29ABCDE1234F1Z5)".into());
        };
        let candidate = text.trim().to_ascii_uppercase();
        if is_valid_gst(&candidate) {
            Ok(FieldValue::text(candidate))
        } else {
            Err("Invalid GST format (e.g., 29ABCDE1234F1Z5)".into())
        }
    }))
}

fn is_valid_pan(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.len() == 10
        && chars[0..5].iter().all(|c| c.is_ascii_uppercase())
        && chars[5..9].iter().all(|c| c.is_ascii_digit())
        && chars[9].is_ascii_uppercase()
}

fn make_pan_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Invalid PAN format (e.g., ABCDE1234F)".into());
        };
        let candidate = text.trim().to_ascii_uppercase();
        if is_valid_pan(&candidate) {
            Ok(FieldValue::text(candidate))
        } else {
            Err("Invalid PAN format (e.g., ABCDE1234F)".into())
        }
    }))
}

fn is_valid_ifsc(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.len() == 11
        && chars[0..4].iter().all(|c| c.is_ascii_uppercase())
        && chars[4] == '0'
        && chars[5..11]
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn make_ifsc_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Invalid IFSC code (e.g., HDFC0001234)".into());
        };
        let candidate = text.trim().to_ascii_uppercase();
        if is_valid_ifsc(&candidate) {
            Ok(FieldValue::text(candidate))
        } else {
            Err("Invalid IFSC code (e.g., HDFC0001234)".into())
        }
    }))
}

fn make_account_number_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let Some(text) = value.as_text() else {
            return Err("Enter a 9 to 18 digit account number".into());
        };
        let trimmed = text.trim();
        if (9..=18).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(FieldValue::text(trimmed))
        } else {
            Err("Enter a 9 to 18 digit account number".into())
        }
    }))
}

fn make_rate_validator() -> Validator {
    Validator::Custom(Arc::new(|value| {
        let number = match value {
            FieldValue::Decimal(number) => Some(*number),
            FieldValue::Integer(number) => Some(*number as f64),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(number) if (0.0..=100.0).contains(&number) => Ok(FieldValue::Decimal(number)),
            _ => Err("Commission must be between 0 and 100".into()),
        }
    }))
}

fn make_notes_validator(max_len: usize) -> Validator {
    Validator::Custom(Arc::new(move |value| match value.as_text() {
        Some(text) if text.trim().chars().count() <= max_len => Ok(FieldValue::text(text.trim())),
        Some(_) => Err(format!("Keep notes under {} characters", max_len)),
        None => Err("Enter text".into()),
    }))
}

/// Prefill presets for the common dealer archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerTemplate {
    Distributor,
    Retailer,
    Franchise,
}

impl DealerTemplate {
    pub fn all() -> [DealerTemplate; 3] {
        [
            DealerTemplate::Distributor,
            DealerTemplate::Retailer,
            DealerTemplate::Franchise,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DealerTemplate::Distributor => "Distributor",
            DealerTemplate::Retailer => "Retailer",
            DealerTemplate::Franchise => "Franchise",
        }
    }

    /// The patch applying this template; merged shallowly like any edit.
    pub fn patch(&self) -> FormPatch {
        match self {
            DealerTemplate::Distributor => FormPatch::new()
                .set("dealer_type", "distributor")
                .set("designation", "Distribution Manager")
                .set("employee_count", "10-50")
                .set("annual_turnover", "1-5 Crores")
                .set(
                    "business_category",
                    FieldValue::list(["seeds", "fertilizers", "pesticides"]),
                ),
            DealerTemplate::Retailer => FormPatch::new()
                .set("dealer_type", "retailer")
                .set("designation", "Store Owner")
                .set("employee_count", "1-10")
                .set("annual_turnover", "10-50 Lakhs")
                .set("business_category", FieldValue::list(["seeds", "tools"])),
            DealerTemplate::Franchise => FormPatch::new()
                .set("dealer_type", "franchise")
                .set("designation", "Franchise Manager")
                .set("employee_count", "5-20")
                .set("annual_turnover", "50 Lakhs - 1 Crore")
                .set(
                    "business_category",
                    FieldValue::list(["seeds", "fertilizers"]),
                ),
        }
    }
}

/// An existing dealer name that is suspiciously close to the one being
/// entered.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub name: String,
    pub similarity: f64,
}

/// Scans known dealer names for likely duplicates of `candidate` using
/// Jaro-Winkler similarity, most similar first.
pub fn scan_duplicates(candidate: &str, existing: &[String]) -> Vec<DuplicateMatch> {
    let needle = candidate.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<DuplicateMatch> = existing
        .iter()
        .filter_map(|name| {
            let similarity = jaro_winkler(&needle, &name.trim().to_lowercase());
            if similarity >= DUPLICATE_THRESHOLD {
                Some(DuplicateMatch {
                    name: name.clone(),
                    similarity,
                })
            } else {
                None
            }
        })
        .collect();
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}

/// Nested GPS coordinates sent only when both halves are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsLocation {
    pub lat: f64,
    pub lng: f64,
}

/// The dealer record as the persistence collaborator expects it. Field
/// names follow the remote schema, which is why `dealer_type` travels as
/// `business_type`; blank optionals are omitted outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub business_name: String,
    pub legal_name: String,
    pub business_type: String,
    pub contact_person: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_location: Option<GpsLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

/// The dealer onboarding flow. Carries the tenant, the create-or-update
/// intent, and the known dealer names used for duplicate scanning.
pub struct DealerFlow {
    tenant: Option<Uuid>,
    action: SubmitAction,
    existing_names: Vec<String>,
}

impl DealerFlow {
    pub fn create() -> Self {
        Self {
            tenant: None,
            action: SubmitAction::Create,
            existing_names: Vec::new(),
        }
    }

    pub fn edit(id: Uuid) -> Self {
        Self {
            tenant: None,
            action: SubmitAction::Update(id),
            existing_names: Vec::new(),
        }
    }

    pub fn for_tenant(mut self, tenant: Uuid) -> Self {
        self.tenant = Some(tenant);
        self
    }

    pub fn with_existing_names(mut self, names: Vec<String>) -> Self {
        self.existing_names = names;
        self
    }

    /// Likely duplicates of the business name currently entered.
    pub fn duplicates(&self, state: &FormState) -> Vec<DuplicateMatch> {
        scan_duplicates(
            state.text("business_name").unwrap_or_default(),
            &self.existing_names,
        )
    }
}

/// `"10-50"` counts as 10; `"100+"` counts as 100.
fn band_floor(band: &str) -> Option<i64> {
    band.split('-')
        .next()
        .map(|part| part.trim_end_matches('+'))
        .and_then(|part| part.trim().parse::<i64>().ok())
}

impl WizardFlow for DealerFlow {
    type Record = DealerRecord;

    fn descriptor(&self) -> Arc<WizardDescriptor> {
        Arc::clone(&DESCRIPTOR)
    }

    fn seed(&self) -> FormState {
        FormState::seeded(
            FormPatch::new()
                .set("country", "India")
                .set("credit_limit", 100_000i64)
                .set("payment_terms", "30")
                .set("commission_rate", 5i64),
        )
    }

    fn action(&self) -> SubmitAction {
        self.action
    }

    fn commit(&self, state: &FormState) -> Result<DealerRecord, ValidationFailure> {
        let mut errors = Vec::new();
        let business_name = required_text(state, "business_name", &mut errors);
        let business_type = required_text(state, "dealer_type", &mut errors);
        let contact_person = required_text(state, "contact_person", &mut errors);
        let phone = required_text(state, "phone", &mut errors);
        let email = required_text(state, "email", &mut errors);
        let address_line1 = required_text(state, "address_line1", &mut errors);
        let city = required_text(state, "city", &mut errors);
        let state_name = required_text(state, "state", &mut errors);
        let country = required_text(state, "country", &mut errors);
        let postal_code = required_text(state, "postal_code", &mut errors);
        if !errors.is_empty() {
            return Err(ValidationFailure::new(errors));
        }

        let legal_name = optional_text(state, "legal_name").unwrap_or_else(|| business_name.clone());
        let gps_location = match (state.decimal("gps_latitude"), state.decimal("gps_longitude")) {
            (Some(lat), Some(lng)) => Some(GpsLocation { lat, lng }),
            _ => None,
        };

        let mut metadata = BTreeMap::new();
        if let Some(registration) = optional_text(state, "registration_number") {
            metadata.insert("registration_number".to_string(), Value::String(registration));
        }
        if let Some(license) = optional_text(state, "license_number") {
            metadata.insert("license_number".to_string(), Value::String(license));
        }
        let bank_fields = [
            ("bank_name", "bank_name"),
            ("bank_account_number", "account_number"),
            ("bank_ifsc", "ifsc_code"),
        ];
        let mut bank_details = serde_json::Map::new();
        for (state_key, record_key) in bank_fields {
            if let Some(value) = optional_text(state, state_key) {
                bank_details.insert(record_key.to_string(), Value::String(value));
            }
        }
        if !bank_details.is_empty() {
            metadata.insert("bank_details".to_string(), Value::Object(bank_details));
        }
        if let Some(turnover) = optional_text(state, "annual_turnover") {
            metadata.insert("annual_turnover".to_string(), Value::String(turnover));
        }
        if let Some(categories) = state.get("business_category") {
            if !categories.is_blank() {
                metadata.insert("business_category".to_string(), categories.to_json());
            }
        }
        if let Some(territory) = optional_text(state, "territory") {
            metadata.insert("territory".to_string(), Value::String(territory));
        }
        if let Some(notes) = optional_text(state, "notes") {
            metadata.insert("notes".to_string(), Value::String(notes));
        }

        let creating = matches!(self.action, SubmitAction::Create);
        Ok(DealerRecord {
            tenant_id: self.tenant,
            business_name,
            legal_name,
            business_type,
            contact_person,
            designation: optional_text(state, "designation"),
            phone,
            email,
            alternate_phone: optional_text(state, "alternate_phone"),
            alternate_email: optional_text(state, "alternate_email"),
            website: optional_text(state, "website"),
            address_line1,
            address_line2: optional_text(state, "address_line2"),
            city,
            state: state_name,
            country,
            postal_code,
            gps_location,
            gst_number: optional_text(state, "gst_number"),
            pan_number: optional_text(state, "pan_number"),
            establishment_year: state.integer("establishment_year"),
            employee_count: state
                .text("employee_count")
                .and_then(band_floor),
            credit_limit: state.decimal("credit_limit"),
            payment_terms: optional_text(state, "payment_terms"),
            commission_rate: state.decimal("commission_rate"),
            status: creating.then_some("active"),
            onboarding_status: creating.then_some("pending"),
            verification_status: creating.then_some("pending"),
            is_active: creating.then_some(true),
            metadata,
        })
    }
}
