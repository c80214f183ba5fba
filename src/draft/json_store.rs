use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{paths, DraftEnvelope, DraftError, DraftResult, DraftStore};

const TMP_SUFFIX: &str = "tmp";

/// File-backed draft store: one JSON document per draft key.
///
/// Writes go through a temp file in the same directory followed by a
/// rename, so a crash mid-save leaves the previous draft intact.
pub struct JsonDraftStore {
    root: PathBuf,
}

impl JsonDraftStore {
    /// Creates the store rooted at `root`, defaulting to the shared drafts
    /// directory. The directory is created if missing.
    pub fn new(root: Option<PathBuf>) -> DraftResult<Self> {
        let root = root.unwrap_or_else(paths::drafts_dir);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn draft_path(&self, key: &str) -> DraftResult<PathBuf> {
        Ok(self.root.join(format!("{}.json", canonical_key(key)?)))
    }
}

impl DraftStore for JsonDraftStore {
    fn save(&self, key: &str, draft: &DraftEnvelope) -> DraftResult<()> {
        let path = self.draft_path(key)?;
        let json = serde_json::to_string_pretty(draft)?;
        write_atomic(&path, &json)?;
        Ok(())
    }

    fn load(&self, key: &str) -> DraftResult<Option<DraftEnvelope>> {
        let path = self.draft_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let envelope = serde_json::from_str(&raw)?;
        Ok(Some(envelope))
    }

    fn clear(&self, key: &str) -> DraftResult<()> {
        let path = self.draft_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn list(&self) -> DraftResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn canonical_key(key: &str) -> DraftResult<String> {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        Err(DraftError::InvalidKey(key.to_string()))
    } else {
        Ok(sanitized)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> DraftResult<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    sync_parent_dir(path)?;
    Ok(())
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> DraftResult<()> {
    if let Some(parent) = path.parent() {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> DraftResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FormPatch, FormState};
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonDraftStore, TempDir) {
        let temp = TempDir::new().expect("create temp dir");
        let store =
            JsonDraftStore::new(Some(temp.path().join("drafts"))).expect("create draft store");
        (store, temp)
    }

    fn sample_state() -> FormState {
        FormState::seeded(
            FormPatch::new()
                .set("business_name", "Shetkari Agro")
                .set("credit_limit", 100_000i64),
        )
    }

    #[test]
    fn save_load_round_trip() {
        let (store, _guard) = store_with_temp_dir();
        store
            .save("dealer_form_draft", &DraftEnvelope::new(sample_state()))
            .unwrap();

        let loaded = store.load("dealer_form_draft").unwrap().unwrap();
        assert_eq!(loaded.values, sample_state());
        assert_eq!(loaded.schema_version, super::super::DRAFT_SCHEMA_VERSION);
    }

    #[test]
    fn keys_are_sanitized_to_file_names() {
        let (store, _guard) = store_with_temp_dir();
        store
            .save("Dealer Form #2", &DraftEnvelope::new(sample_state()))
            .unwrap();
        assert!(store.root().join("dealer_form__2.json").exists());
        assert!(store.load("dealer form #2").unwrap().is_some());
    }

    #[test]
    fn punctuation_only_keys_are_rejected() {
        let (store, _guard) = store_with_temp_dir();
        assert!(matches!(
            store.save("##", &DraftEnvelope::new(sample_state())),
            Err(DraftError::InvalidKey(_))
        ));
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, _guard) = store_with_temp_dir();
        store
            .save("campaign", &DraftEnvelope::new(sample_state()))
            .unwrap();
        store.clear("campaign").unwrap();
        store.clear("campaign").unwrap();
        assert!(store.load("campaign").unwrap().is_none());
    }

    #[test]
    fn unreadable_drafts_surface_as_errors() {
        let (store, _guard) = store_with_temp_dir();
        fs::write(store.root().join("broken.json"), "{not json").unwrap();
        assert!(store.load("broken").is_err());
    }

    #[test]
    fn list_returns_sorted_keys() {
        let (store, _guard) = store_with_temp_dir();
        store.save("zeta", &DraftEnvelope::new(sample_state())).unwrap();
        store.save("alpha", &DraftEnvelope::new(sample_state())).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }
}
