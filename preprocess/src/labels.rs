use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub label: Label,
    pub id: usize,
}

/// Dense integer ids given to textual labels in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct LabelMapping {
    entries: Vec<LabelEntry>,
    ids: HashMap<Label, usize>,
}

impl LabelMapping {
    /// Replaces every label with its id and returns the mapping used.
    pub fn intern(labels: &mut [Label]) -> LabelMapping {
        let mut mapping = LabelMapping::default();
        for label in labels.iter_mut() {
            let id = mapping.insert(label);
            *label = id.to_string();
        }
        mapping
    }

    fn insert(&mut self, label: &str) -> usize {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.entries.len();
        self.ids.insert(label.to_owned(), id);
        self.entries.push(LabelEntry { label: label.to_owned(), id });
        id
    }

    pub fn id(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Writes the mapping as a JSON array of `{ "label", "id" }` objects.
    pub fn write_json<W: io::Write>(&self, destination: W) -> Result<()> {
        serde_json::to_writer_pretty(destination, &self.entries)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_follow_first_appearance() {
        let mut labels: Vec<Label> = ["king", "queen", "king", "rook"].map(String::from).to_vec();
        let mapping = LabelMapping::intern(&mut labels);

        assert_eq!(labels, ["0", "1", "0", "2"]);
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.id("rook"), Some(2));
        assert_eq!(mapping.id("pawn"), None);
    }

    #[test]
    fn json_lists_entries() {
        let mut labels = vec!["a".to_owned(), "b".to_owned()];
        let mapping = LabelMapping::intern(&mut labels);

        let mut out = Vec::new();
        mapping.write_json(&mut out).unwrap();
        let entries: Vec<LabelEntry> = serde_json::from_slice(&out).unwrap();
        assert_eq!(entries, mapping.entries());
    }
}
