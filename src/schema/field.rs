use crate::state::FieldValue;

use super::validate::Validator;

/// Supported data kinds for form fields.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    Boolean,
    Choice(Vec<String>),
    MultiChoice(Vec<String>),
}

/// Declarative description of a single form field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
    pub validator: Validator,
}

impl FieldDescriptor {
    pub fn new(
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        validator: Validator,
    ) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
            validator,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Runs the field's validator, falling back to a kind-implied check when
    /// no validator was declared. Returns the normalized value to store.
    pub fn check(&self, value: &FieldValue) -> Result<FieldValue, String> {
        match (&self.kind, &self.validator) {
            (FieldKind::Choice(options), Validator::None) => {
                Validator::OneOf(options.clone()).check(value)
            }
            (FieldKind::MultiChoice(options), Validator::None) => {
                Validator::SubsetOf(options.clone()).check(value)
            }
            (FieldKind::Boolean, Validator::None) => match value {
                FieldValue::Bool(_) => Ok(value.clone()),
                FieldValue::Text(text) => match text.trim().to_lowercase().as_str() {
                    "y" | "yes" | "true" | "1" => Ok(FieldValue::Bool(true)),
                    "n" | "no" | "false" | "0" => Ok(FieldValue::Bool(false)),
                    _ => Err("Enter yes/no, true/false, or 1/0 to indicate boolean values".into()),
                },
                _ => Err("Enter yes/no, true/false, or 1/0 to indicate boolean values".into()),
            },
            (kind, Validator::None) => match kind {
                FieldKind::Integer => Validator::Integer.check(value),
                FieldKind::Decimal => Validator::Decimal.check(value),
                FieldKind::Date => Validator::Date.check(value),
                _ => Ok(value.clone()),
            },
            (_, validator) => validator.check(value),
        }
    }
}
