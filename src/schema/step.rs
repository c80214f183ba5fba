use std::sync::Arc;

use crate::state::FormState;

use super::field::FieldDescriptor;
use super::validate::{FieldError, ValidationFailure};

/// Cross-field check run after a step's field-level validation passes.
pub type StepCheck = Arc<dyn Fn(&FormState) -> Result<(), Vec<FieldError>> + Send + Sync>;

/// One named step of a wizard: its editable fields plus an optional
/// cross-field check.
#[derive(Clone)]
pub struct StepDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub check: Option<StepCheck>,
}

impl StepDescriptor {
    pub fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            fields: Vec::new(),
            check: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_check(mut self, check: StepCheck) -> Self {
        self.check = Some(check);
        self
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.key)
    }

    /// Validates the step against the current state, normalizing values in
    /// place. Blank optional fields are skipped; blank required fields fail.
    /// The cross-field check only runs once field-level validation passes.
    pub fn validate(&self, state: &mut FormState) -> Result<(), ValidationFailure> {
        let mut errors = Vec::new();
        let mut normalized = Vec::new();

        for field in &self.fields {
            match state.get(field.key) {
                None => {
                    if field.required {
                        errors.push(FieldError::new(
                            field.key,
                            format!("{} is required", field.label),
                        ));
                    }
                }
                Some(value) if value.is_blank() => {
                    if field.required {
                        errors.push(FieldError::new(
                            field.key,
                            format!("{} is required", field.label),
                        ));
                    }
                }
                Some(value) => match field.check(value) {
                    Ok(checked) => {
                        if checked != *value {
                            normalized.push((field.key, checked));
                        }
                    }
                    Err(message) => errors.push(FieldError::new(field.key, message)),
                },
            }
        }

        for (key, value) in normalized {
            state.set(key, value);
        }

        if errors.is_empty() {
            if let Some(check) = &self.check {
                if let Err(mut step_errors) = check(state) {
                    errors.append(&mut step_errors);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(errors))
        }
    }
}

/// Metadata describing a full wizard: the ordered step registry.
#[derive(Clone)]
pub struct WizardDescriptor {
    pub name: &'static str,
    pub steps: Vec<StepDescriptor>,
}

impl WizardDescriptor {
    pub fn new(name: &'static str, steps: Vec<StepDescriptor>) -> Self {
        Self { name, steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn terminal_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn step_by_id(&self, id: &str) -> Option<(usize, &StepDescriptor)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, step)| step.id == id)
    }

    /// First descriptor declared for the key, in step order.
    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|field| field.key == key)
    }

    /// Required keys across every step, in declaration order.
    pub fn required_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        for step in &self.steps {
            for key in step.required_keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Validates every step against the state, collecting failures from all
    /// of them. Used by submission, where the whole record must hold.
    pub fn validate_all(&self, state: &mut FormState) -> Result<(), ValidationFailure> {
        let mut errors = Vec::new();
        for step in &self.steps {
            if let Err(failure) = step.validate(state) {
                errors.extend(failure.errors);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate::Validator;
    use crate::schema::FieldKind;
    use crate::state::{FieldValue, FormPatch};

    fn contact_step() -> StepDescriptor {
        StepDescriptor::new("contact", "Contact").with_fields(vec![
            FieldDescriptor::new("phone", "Phone", FieldKind::Text, Validator::NonEmpty),
            FieldDescriptor::new("email", "Email", FieldKind::Text, Validator::Email)
                .with_optional(),
        ])
    }

    #[test]
    fn missing_required_field_blocks_validation() {
        let step = contact_step();
        let mut state = FormState::new();
        let failure = step.validate(&mut state).unwrap_err();
        assert!(failure.contains("phone"));
        assert!(!failure.contains("email"));
    }

    #[test]
    fn blank_optional_fields_are_skipped() {
        let step = contact_step();
        let mut state = FormState::seeded(FormPatch::new().set("phone", "98220 00110").set("email", ""));
        assert!(step.validate(&mut state).is_ok());
    }

    #[test]
    fn validation_normalizes_in_place() {
        let step = StepDescriptor::new("basic", "Basic").with_fields(vec![FieldDescriptor::new(
            "credit_limit",
            "Credit limit",
            FieldKind::Decimal,
            Validator::NonNegativeNumber,
        )]);
        let mut state = FormState::seeded(FormPatch::new().set("credit_limit", "100000"));
        step.validate(&mut state).unwrap();
        assert_eq!(state.get("credit_limit"), Some(&FieldValue::Integer(100000)));
    }

    #[test]
    fn cross_field_check_waits_for_field_level_pass() {
        let step = contact_step().with_check(Arc::new(|state: &FormState| {
            if state.is_blank("email") {
                Err(vec![FieldError::new("email", "Email needed for invoicing")])
            } else {
                Ok(())
            }
        }));

        let mut state = FormState::new();
        let failure = step.validate(&mut state).unwrap_err();
        // Field-level failure reported alone; the check did not run.
        assert_eq!(failure.fields(), vec!["phone"]);

        let mut state = FormState::seeded(FormPatch::new().set("phone", "98220 00110"));
        let failure = step.validate(&mut state).unwrap_err();
        assert_eq!(failure.fields(), vec!["email"]);
    }

    #[test]
    fn descriptor_collects_required_keys_across_steps() {
        let wizard = WizardDescriptor::new(
            "dealer",
            vec![
                StepDescriptor::new("basic", "Basic").with_fields(vec![FieldDescriptor::new(
                    "name",
                    "Name",
                    FieldKind::Text,
                    Validator::NonEmpty,
                )]),
                contact_step(),
            ],
        );
        assert_eq!(wizard.required_keys(), vec!["name", "phone"]);
        assert_eq!(wizard.terminal_index(), 1);
    }
}
