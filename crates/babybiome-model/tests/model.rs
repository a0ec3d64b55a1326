//! Tests for babybiome-model types.

use std::collections::HashSet;
use std::path::Path;

use babybiome_model::{
    ColumnMapping, ExclusionCondition, ExclusionList, MemberRole, RoleFields, notes_column,
};
use proptest::prelude::*;

#[test]
fn exclusion_list_from_toml() {
    let toml = r#"
[[exclusion]]
family = "B001"
time_point = "9Monate"
when = { not_null = "probe_date_mpi" }

[[exclusion]]
family = "B034"
when = { equals = { column = "weight_mother", value = "75" } }
"#;
    let list = ExclusionList::from_toml_str(toml, Path::new("exclusions.toml"))
        .expect("parse exclusions");
    assert_eq!(list.rules.len(), 2);
    assert_eq!(list.rules[0].time_point.as_deref(), Some("9Monate"));
    assert_eq!(
        list.rules[1].when,
        Some(ExclusionCondition::Equals {
            column: "weight_mother".to_string(),
            value: "75".to_string(),
        })
    );
    assert!(list.rules[1].time_point.is_none());
}

#[test]
fn exclusion_list_missing_file() {
    let err = ExclusionList::from_toml_path(Path::new("/nonexistent/exclusions.toml"))
        .expect_err("missing file");
    assert!(err.to_string().contains("exclusions.toml"));
}

#[test]
fn exclusion_list_serializes() {
    let list = ExclusionList::default();
    let json = serde_json::to_string(&list).expect("serialize list");
    let round: ExclusionList = serde_json::from_str(&json).expect("deserialize list");
    assert_eq!(round, list);
}

#[test]
fn sample_ids_unique_across_roles() {
    let ids: HashSet<String> = MemberRole::ALL
        .iter()
        .map(|role| role.sample_id("B010", "6Monate"))
        .collect();
    assert_eq!(ids.len(), MemberRole::ALL.len());
}

#[test]
fn every_role_requires_its_triad() {
    for fields in RoleFields::all() {
        let required = fields.required_columns();
        for column in fields.sample_triad() {
            assert!(required.contains(&column), "{column} missing for {}", fields.role);
        }
    }
}

proptest! {
    #[test]
    fn renames_always_map_companions(
        pairs in prop::collection::vec(("[a-z]{1,8}", "[A-Z]{1,8}"), 0..10)
    ) {
        let mapping = ColumnMapping::new(pairs.clone(), Vec::new());
        let map = mapping.expanded_renames();
        for (old, _) in &pairs {
            let new = map.get(old).expect("renamed");
            prop_assert_eq!(map.get(&notes_column(old)), Some(&notes_column(new)));
        }
    }
}
