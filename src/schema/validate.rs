use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::state::FieldValue;

/// An inline error attached to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The collected field errors of one blocked transition or submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Names of the offending fields, in reporting order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|error| error.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "Validation failed"),
            [single] => write!(f, "{}", single),
            many => {
                let fields: Vec<&str> = many.iter().map(|error| error.field.as_str()).collect();
                write!(f, "Check the following fields: {}", fields.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

type CheckCallback = dyn Fn(&FieldValue) -> Result<FieldValue, String> + Send + Sync;
pub type SharedCheck = Arc<CheckCallback>;

/// Built-in validation helpers.
///
/// Validators both check and normalize: a successful run returns the value
/// to store, so text input coerces into the typed variant it represents
/// (for example `"42"` becomes a whole number).
#[derive(Clone, Default)]
pub enum Validator {
    #[default]
    None,
    NonEmpty,
    Integer,
    Decimal,
    PositiveNumber,
    NonNegativeNumber,
    Date,
    Email,
    OneOf(Vec<String>),
    SubsetOf(Vec<String>),
    Custom(SharedCheck),
}

impl Validator {
    pub fn check(&self, value: &FieldValue) -> Result<FieldValue, String> {
        match self {
            Validator::None => Ok(value.clone()),
            Validator::NonEmpty => {
                if value.is_blank() {
                    return Err("Value cannot be empty".into());
                }
                match value.as_text() {
                    Some(text) => Ok(FieldValue::text(text.trim())),
                    None => Ok(value.clone()),
                }
            }
            Validator::Integer => match value {
                FieldValue::Integer(_) => Ok(value.clone()),
                FieldValue::Decimal(number) if number.fract() == 0.0 => {
                    Ok(FieldValue::Integer(*number as i64))
                }
                FieldValue::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(FieldValue::Integer)
                    .map_err(|_| "Enter a whole number (e.g., 42)".to_string()),
                _ => Err("Enter a whole number (e.g., 42)".into()),
            },
            Validator::Decimal => numeric(value).map(|(normalized, _)| normalized),
            Validator::PositiveNumber => {
                let (normalized, amount) = numeric(value)?;
                if amount > 0.0 {
                    Ok(normalized)
                } else {
                    Err("Value must be greater than zero".into())
                }
            }
            Validator::NonNegativeNumber => {
                let (normalized, amount) = numeric(value)?;
                if amount >= 0.0 {
                    Ok(normalized)
                } else {
                    Err("Value cannot be negative".into())
                }
            }
            Validator::Date => match value.as_text() {
                Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                    .map(|date| FieldValue::text(date.to_string()))
                    .map_err(|_| "Use YYYY-MM-DD format".to_string()),
                None => Err("Use YYYY-MM-DD format".into()),
            },
            Validator::Email => match value.as_text() {
                Some(text) => check_email(text.trim()).map(FieldValue::text),
                None => Err("Enter a valid email address".into()),
            },
            Validator::OneOf(options) => match value.as_text() {
                Some(text) => {
                    let normalized = text.trim().to_lowercase();
                    options
                        .iter()
                        .find(|candidate| candidate.to_lowercase() == normalized)
                        .map(|canonical| FieldValue::text(canonical.clone()))
                        .ok_or_else(|| {
                            format!("Value must be one of: {}", options.join(", "))
                        })
                }
                None => Err(format!("Value must be one of: {}", options.join(", "))),
            },
            Validator::SubsetOf(options) => match value.as_list() {
                Some(items) => {
                    let mut canonical = Vec::with_capacity(items.len());
                    for item in items {
                        let normalized = item.trim().to_lowercase();
                        match options
                            .iter()
                            .find(|candidate| candidate.to_lowercase() == normalized)
                        {
                            Some(found) => canonical.push(found.clone()),
                            None => {
                                return Err(format!(
                                    "Choose values from: {}",
                                    options.join(", ")
                                ))
                            }
                        }
                    }
                    Ok(FieldValue::List(canonical))
                }
                None => Err(format!("Choose values from: {}", options.join(", "))),
            },
            Validator::Custom(func) => func(value),
        }
    }
}

/// Accepts whole numbers, decimals, and numeric text; returns the stored
/// form plus the comparable amount.
fn numeric(value: &FieldValue) -> Result<(FieldValue, f64), String> {
    match value {
        FieldValue::Integer(number) => Ok((value.clone(), *number as f64)),
        FieldValue::Decimal(number) => Ok((value.clone(), *number)),
        FieldValue::Text(text) => {
            let trimmed = text.trim();
            if let Ok(whole) = trimmed.parse::<i64>() {
                return Ok((FieldValue::Integer(whole), whole as f64));
            }
            trimmed
                .parse::<f64>()
                .map(|number| (FieldValue::Decimal(number), number))
                .map_err(|_| "Enter a numeric value".to_string())
        }
        _ => Err("Enter a numeric value".into()),
    }
}

fn check_email(text: &str) -> Result<String, String> {
    let mut parts = text.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let valid = !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !text.chars().any(char::is_whitespace);
    if valid {
        Ok(text.to_string())
    } else {
        Err("Enter a valid email address".into())
    }
}
