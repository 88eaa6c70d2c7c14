//! Global notes keyed by name, independent of any entity's own note.

use crate::model::error::{DataError, DataResult};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// String key to free text, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMap {
    notes: BTreeMap<String, String>,
}

impl NoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Stores `text` under `key`; empty text removes the entry.
    pub fn set(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        if text.is_empty() {
            self.notes.remove(&key);
        } else {
            self.notes.insert(key, text);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.notes.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notes.iter().map(|(key, text)| (key.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteMap {
    /// Builds a map from decoded entries; a repeated key is an error and empty texts are dropped.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> DataResult<Self> {
        let mut notes = BTreeMap::new();
        for (key, text) in entries {
            match notes.entry(key) {
                Entry::Occupied(taken) => {
                    return Err(DataError::DuplicateNoteKey(taken.key().clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(text);
                }
            }
        }
        notes.retain(|_, text: &mut String| !text.is_empty());
        Ok(Self { notes })
    }
}
