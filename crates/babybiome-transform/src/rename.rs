//! Column renaming and pruning driven by the mapping workbooks.

use std::collections::{BTreeMap, HashSet};

use babybiome_model::ColumnMapping;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::table::SheetTable;

/// Counts of applied mapping entries for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    pub renamed: usize,
    pub dropped: usize,
}

/// Rename all headers at once. Names without an entry are kept.
pub fn rename_headers(
    headers: &[String],
    renames: &BTreeMap<String, String>,
) -> Result<(Vec<String>, usize)> {
    let mut renamed = 0;
    let mut seen = HashSet::with_capacity(headers.len());
    let mut result = Vec::with_capacity(headers.len());
    for header in headers {
        let target = match renames.get(header) {
            Some(new) => {
                renamed += 1;
                new.clone()
            }
            None => header.clone(),
        };
        if !seen.insert(target.clone()) {
            return Err(TransformError::RenameCollision {
                from: header.clone(),
                to: target,
            });
        }
        result.push(target);
    }
    Ok((result, renamed))
}

/// Apply renames, then deletions, including `_notes` companions.
/// Entries naming absent columns are ignored.
pub fn apply_mapping(table: &mut SheetTable, mapping: &ColumnMapping) -> Result<MappingOutcome> {
    let (headers, renamed) = rename_headers(&table.headers, &mapping.expanded_renames())?;
    table.headers = headers;
    let dropped = table.drop_columns(&mapping.expanded_deletions());
    debug!(renamed, dropped, columns = table.width(), "applied column mapping");
    Ok(MappingOutcome { renamed, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn renames_are_simultaneous() {
        let map = BTreeMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ]);
        let (renamed, count) = rename_headers(&headers(&["a", "b"]), &map).unwrap();
        assert_eq!(renamed, headers(&["b", "a"]));
        assert_eq!(count, 2);
    }

    #[test]
    fn collision_is_an_error() {
        let map = BTreeMap::from([("a".to_string(), "b".to_string())]);
        let err = rename_headers(&headers(&["a", "b"]), &map).unwrap_err();
        assert!(matches!(err, TransformError::RenameCollision { .. }));
    }

    #[test]
    fn mapping_covers_notes_and_ignores_absent() {
        let mut table = SheetTable::new(
            headers(&["Antibiotika Vater", "Antibiotika Vater_notes", "Unterschrift"]),
            vec![vec![Some("ja".into()), None, Some("x".into())]],
        );
        let mapping = ColumnMapping::new(
            vec![
                ("Antibiotika Vater".to_string(), "antibiotics_father".to_string()),
                ("Fehlt".to_string(), "missing".to_string()),
            ],
            vec!["Unterschrift".to_string(), "Nirgends".to_string()],
        );
        let outcome = apply_mapping(&mut table, &mapping).unwrap();
        assert_eq!(
            table.headers,
            headers(&["antibiotics_father", "antibiotics_father_notes"])
        );
        assert_eq!(outcome, MappingOutcome { renamed: 2, dropped: 1 });

        let again = apply_mapping(&mut table, &mapping).unwrap();
        assert_eq!(again, MappingOutcome::default());
    }
}
