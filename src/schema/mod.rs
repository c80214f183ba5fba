//! Field descriptors, validators, and the ordered step registry.

pub mod field;
pub mod step;
pub mod validate;

pub use field::{FieldDescriptor, FieldKind};
pub use step::{StepCheck, StepDescriptor, WizardDescriptor};
pub use validate::{FieldError, SharedCheck, ValidationFailure, Validator};
