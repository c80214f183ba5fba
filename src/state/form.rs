use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::FieldValue;

/// A partial update produced by one editing interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPatch {
    entries: BTreeMap<String, FieldValue>,
}

impl FormPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl IntoIterator for FormPatch {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormPatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// The accumulated record behind a wizard session.
///
/// Updates are shallow merges: a patch replaces the top-level keys it names
/// and leaves every other key untouched. Nested records are replaced
/// wholesale by a shallow merge, so callers editing one field inside a
/// sub-record must go through [`FormState::apply_nested`], which merges one
/// level deeper and preserves sibling keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    fields: BTreeMap<String, FieldValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(patch: FormPatch) -> Self {
        let mut state = Self::new();
        state.apply(patch);
        state
    }

    /// Shallow-merges a patch into the state. Later values win per key.
    pub fn apply(&mut self, patch: FormPatch) {
        for (key, value) in patch {
            self.fields.insert(key, value);
        }
    }

    /// Merges a patch into the record stored under `key`, preserving sibling
    /// entries of that record. A missing or non-record value under `key` is
    /// replaced by a fresh record first.
    pub fn apply_nested(&mut self, key: impl Into<String>, patch: FormPatch) {
        let key = key.into();
        let entries = match self.fields.get_mut(&key) {
            Some(FieldValue::Record(entries)) => entries,
            _ => {
                self.fields.insert(key.clone(), FieldValue::Record(BTreeMap::new()));
                match self.fields.get_mut(&key) {
                    Some(FieldValue::Record(entries)) => entries,
                    _ => unreachable!("record was just inserted"),
                }
            }
        };
        for (nested_key, value) in patch {
            entries.insert(nested_key, value);
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_integer)
    }

    pub fn decimal(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_decimal)
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FieldValue::as_list)
    }

    pub fn record(&self, key: &str) -> Option<&BTreeMap<String, FieldValue>> {
        self.get(key).and_then(FieldValue::as_record)
    }

    /// Missing keys and blank values both count as "not provided".
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).map_or(true, FieldValue::is_blank)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_merge_keeps_untouched_keys() {
        let mut state = FormState::new();
        state.apply(FormPatch::new().set("name", "Acme").set("city", "Pune"));
        state.apply(FormPatch::new().set("city", "Nashik"));

        assert_eq!(state.text("name"), Some("Acme"));
        assert_eq!(state.text("city"), Some("Nashik"));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn nested_merge_preserves_sibling_fields() {
        let mut state = FormState::new();
        state.apply_nested(
            "schedule",
            FormPatch::new().set("start_date", "2025-06-01").set("timezone", "Asia/Kolkata"),
        );
        state.apply_nested("schedule", FormPatch::new().set("start_date", "2025-07-01"));

        let schedule = state.record("schedule").unwrap();
        assert_eq!(
            schedule.get("timezone"),
            Some(&FieldValue::text("Asia/Kolkata"))
        );
        assert_eq!(
            schedule.get("start_date"),
            Some(&FieldValue::text("2025-07-01"))
        );
    }

    #[test]
    fn nested_merge_replaces_non_record_values() {
        let mut state = FormState::new();
        state.set("schedule", "tbd");
        state.apply_nested("schedule", FormPatch::new().set("timezone", "UTC"));

        let schedule = state.record("schedule").unwrap();
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn blank_checks_span_missing_and_empty() {
        let mut state = FormState::new();
        state.set("name", "");
        assert!(state.is_blank("name"));
        assert!(state.is_blank("phone"));
        state.set("name", "Acme");
        assert!(!state.is_blank("name"));
    }
}
