use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".wizard_core";
const DRAFT_DIR: &str = "drafts";

/// Returns the application-specific data directory, defaulting to
/// `~/.wizard_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("WIZARD_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Default directory holding persisted drafts.
pub fn drafts_dir() -> PathBuf {
    app_data_dir().join(DRAFT_DIR)
}
