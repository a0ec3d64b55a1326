//! Column rename and deletion tables.
//!
//! Every answer column in the questionnaire has a companion column holding
//! the cell comments, named `<answer>_notes`. A mapping entry for an answer
//! column implicitly covers its companion, so the tables only list the
//! answer names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const NOTES_SUFFIX: &str = "_notes";

/// Name of the comment companion column for `column`.
pub fn notes_column(column: &str) -> String {
    format!("{column}{NOTES_SUFFIX}")
}

/// Rename pairs and deletions, as read from the two mapping workbooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub renames: Vec<(String, String)>,
    pub deletions: Vec<String>,
}

impl ColumnMapping {
    pub fn new(renames: Vec<(String, String)>, deletions: Vec<String>) -> Self {
        Self { renames, deletions }
    }

    /// Full rename map including `_notes` companions.
    ///
    /// Later entries for the same old name win, matching a dictionary built
    /// row by row from the workbook. Companions follow the winning entry; an
    /// explicit `_notes` row in the table overrides its derived companion.
    pub fn expanded_renames(&self) -> BTreeMap<String, String> {
        let direct: BTreeMap<&str, &str> = self
            .renames
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect();
        let mut map: BTreeMap<String, String> = direct
            .iter()
            .map(|(old, new)| (notes_column(old), notes_column(new)))
            .collect();
        for (old, new) in direct {
            map.insert(old.to_string(), new.to_string());
        }
        map
    }

    /// Deletion list including `_notes` companions, without duplicates.
    pub fn expanded_deletions(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.deletions.len() * 2);
        for name in &self.deletions {
            for candidate in [name.clone(), notes_column(name)] {
                if !names.contains(&candidate) {
                    names.push(candidate);
                }
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.deletions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_cover_notes_companions() {
        let mapping = ColumnMapping::new(
            vec![("Antibiotika Vater".to_string(), "antibiotics_father".to_string())],
            Vec::new(),
        );
        let map = mapping.expanded_renames();
        assert_eq!(
            map.get("Antibiotika Vater_notes").map(String::as_str),
            Some("antibiotics_father_notes")
        );
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn explicit_notes_entry_wins_over_companion() {
        let mapping = ColumnMapping::new(
            vec![
                ("a".to_string(), "x".to_string()),
                ("a_notes".to_string(), "comment_x".to_string()),
            ],
            Vec::new(),
        );
        let map = mapping.expanded_renames();
        assert_eq!(map.get("a_notes").map(String::as_str), Some("comment_x"));
    }

    #[test]
    fn repeated_old_name_keeps_companion_with_last_entry() {
        let mapping = ColumnMapping::new(
            vec![
                ("x".to_string(), "A".to_string()),
                ("x".to_string(), "B".to_string()),
            ],
            Vec::new(),
        );
        let map = mapping.expanded_renames();
        assert_eq!(map.get("x").map(String::as_str), Some("B"));
        assert_eq!(map.get("x_notes").map(String::as_str), Some("B_notes"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn deletions_cover_notes_companions() {
        let mapping = ColumnMapping::new(Vec::new(), vec!["Unterschrift".to_string()]);
        assert_eq!(
            mapping.expanded_deletions(),
            vec!["Unterschrift", "Unterschrift_notes"]
        );
    }
}
