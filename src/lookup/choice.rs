use std::collections::HashMap;

use super::Choice;

/// Maps user-facing selections back to stable choice ids.
///
/// Selections may arrive as a 1-based index, the bare label, or the
/// bracketed display label; all comparisons are case-insensitive. Flow code
/// stores the resolved id, never the label.
#[derive(Clone)]
pub struct ChoiceMapper {
    choices: Vec<Choice>,
    display: Vec<String>,
    alias_to_index: HashMap<String, usize>,
}

impl ChoiceMapper {
    pub fn new(choices: Vec<Choice>) -> Self {
        let mut display = Vec::new();
        let mut alias_to_index = HashMap::new();

        for (idx, choice) in choices.iter().enumerate() {
            let index = idx + 1;
            let display_label = format!("[{}] {}", index, choice.label);
            alias_to_index.insert(index.to_string(), idx);
            alias_to_index.insert(choice.label.to_ascii_lowercase(), idx);
            alias_to_index.insert(display_label.to_ascii_lowercase(), idx);
            alias_to_index.insert(choice.id.to_ascii_lowercase(), idx);
            display.push(display_label);
        }

        Self {
            choices,
            display,
            alias_to_index,
        }
    }

    /// Numbered labels suitable for rendering a pick list.
    pub fn options(&self) -> Vec<String> {
        self.display.clone()
    }

    pub fn resolve(&self, input: &str) -> Option<&Choice> {
        let key = input.trim().to_ascii_lowercase();
        self.alias_to_index
            .get(&key)
            .and_then(|index| self.choices.get(*index))
    }

    pub fn by_id(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}
