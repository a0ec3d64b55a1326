//! Property tests for renaming and the text classifiers.

use std::collections::BTreeSet;

use babybiome_model::ColumnMapping;
use babybiome_transform::rules::{SmokingStatus, classify_probiotics, classify_smoking};
use babybiome_transform::{Canonicalizer, SheetTable, apply_mapping};
use proptest::prelude::*;

fn table(headers: &[String]) -> SheetTable {
    SheetTable::new(headers.to_vec(), vec![vec![None; headers.len()]])
}

proptest! {
    #[test]
    fn bijective_rename_then_inverse_restores_headers(
        names in prop::collection::btree_set("[a-z]{1,6}", 1..12)
    ) {
        let headers: Vec<String> = names.iter().cloned().collect();
        let forward: Vec<(String, String)> = headers
            .iter()
            .map(|name| (name.clone(), name.to_uppercase()))
            .collect();
        let inverse: Vec<(String, String)> = forward
            .iter()
            .map(|(old, new)| (new.clone(), old.clone()))
            .collect();

        let mut sheet = table(&headers);
        apply_mapping(&mut sheet, &ColumnMapping::new(forward, Vec::new())).unwrap();
        let upper: BTreeSet<String> = headers.iter().map(|name| name.to_uppercase()).collect();
        prop_assert_eq!(sheet.headers.iter().cloned().collect::<BTreeSet<_>>(), upper);

        apply_mapping(&mut sheet, &ColumnMapping::new(inverse, Vec::new())).unwrap();
        prop_assert_eq!(&sheet.headers, &headers);
    }

    #[test]
    fn reapplying_a_mapping_is_a_no_op(
        names in prop::collection::btree_set("[a-z]{1,6}", 1..12),
        deleted in 0usize..12,
    ) {
        let headers: Vec<String> = names.iter().cloned().collect();
        let renames: Vec<(String, String)> = headers
            .iter()
            .skip(1)
            .map(|name| (name.clone(), format!("{name}_v2")))
            .collect();
        let deletions = headers.get(deleted).cloned().into_iter().collect();
        let mapping = ColumnMapping::new(renames, deletions);

        let mut sheet = table(&headers);
        apply_mapping(&mut sheet, &mapping).unwrap();
        let once = sheet.headers.clone();
        let outcome = apply_mapping(&mut sheet, &mapping).unwrap();
        prop_assert_eq!(outcome.renamed, 0);
        prop_assert_eq!(outcome.dropped, 0);
        prop_assert_eq!(sheet.headers, once);
    }

    #[test]
    fn probiotics_flags_are_monotone(prefix in ".{0,40}", suffix in ".{0,40}") {
        let base = classify_probiotics(&prefix);
        let extended = classify_probiotics(&format!("{prefix} {suffix}"));
        prop_assert!(!base.mother || extended.mother);
        prop_assert!(!base.father || extended.father);
        prop_assert!(!base.sibling1 || extended.sibling1);
        prop_assert!(!base.sibling2 || extended.sibling2);
        prop_assert!(!base.baby1 || extended.baby1);
        prop_assert!(!base.baby2 || extended.baby2);
        prop_assert!(!base.bifido || extended.bifido);
        prop_assert!(!base.lakt || extended.lakt);
        prop_assert!(!base.ecoli || extended.ecoli);
    }

    #[test]
    fn never_wins_over_other_answers(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
        let text = format!("{prefix}nie{suffix}");
        prop_assert_eq!(classify_smoking(&text), Some(SmokingStatus::Never));
    }

    #[test]
    fn canonicalization_is_idempotent(answer in ".{0,30}") {
        let canon = Canonicalizer::baby_sheets().unwrap();
        let once = canon.canonicalize_value(&answer);
        prop_assert_eq!(canon.canonicalize_value(&once), once.clone());
    }
}
