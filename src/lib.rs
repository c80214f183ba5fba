#![doc(test(attr(deny(warnings))))]

//! Wizard Core offers foundational stepped-form, validation, and draft
//! persistence primitives that power multi-step data-entry workflows.

pub mod draft;
pub mod errors;
pub mod flows;
pub mod lookup;
pub mod schema;
pub mod session;
pub mod state;
pub mod submit;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Wizard Core tracing initialized.");
    });
}
