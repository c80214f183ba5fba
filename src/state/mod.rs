//! Typed form values and the accumulating state store.

pub mod form;
pub mod value;

pub use form::{FormPatch, FormState};
pub use value::FieldValue;
