//! Removal of known duplicate timepoint rows.

use babybiome_ingest::any_to_string_non_empty;
use babybiome_model::{ExclusionCondition, ExclusionList};
use polars::prelude::{AnyValue, DataFrame};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::frame::{filter_rows, require_column, string_values};
use crate::shape::{FAMILY_COLUMN, TIME_POINT_COLUMN};

const CONTEXT: &str = "exclusion";

/// Drop every row matched by an entry of `exclusions`. Condition values are
/// compared in their rendered form, so `75` matches an integer or a float
/// column. Returns the number of removed rows.
pub fn apply_exclusions(df: &mut DataFrame, exclusions: &ExclusionList) -> Result<usize> {
    if exclusions.rules.is_empty() {
        return Ok(0);
    }
    let families = string_values(df, FAMILY_COLUMN, CONTEXT)?;
    let time_points = string_values(df, TIME_POINT_COLUMN, CONTEXT)?;
    for column in exclusions.referenced_columns() {
        require_column(df, column, CONTEXT)?;
    }

    let mut keep = vec![true; df.height()];
    for (row, keep_row) in keep.iter_mut().enumerate() {
        let family = families[row]
            .as_deref()
            .ok_or_else(|| missing_key(FAMILY_COLUMN, row))?;
        let time_point = time_points[row]
            .as_deref()
            .ok_or_else(|| missing_key(TIME_POINT_COLUMN, row))?;
        for rule in &exclusions.rules {
            if !rule.matches_key(family, time_point) {
                continue;
            }
            let matched = match &rule.when {
                None => true,
                Some(condition) => condition_holds(df, condition, row)?,
            };
            if matched {
                info!(family, time_point, "excluding duplicate timepoint row");
                *keep_row = false;
                break;
            }
        }
    }

    let removed = keep.iter().filter(|keep| !**keep).count();
    if removed > 0 {
        filter_rows(df, &keep)?;
    }
    Ok(removed)
}

fn condition_holds(df: &DataFrame, condition: &ExclusionCondition, row: usize) -> Result<bool> {
    let column = require_column(df, condition.column(), CONTEXT)?;
    let value = any_to_string_non_empty(column.get(row).unwrap_or(AnyValue::Null));
    Ok(match condition {
        ExclusionCondition::NotNull(_) => value.is_some(),
        ExclusionCondition::Equals { value: expected, .. } => {
            value.as_deref() == Some(expected.as_str())
        }
    })
}

fn missing_key(column: &str, row: usize) -> TransformError {
    TransformError::MissingKey {
        column: column.to_string(),
        row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use babybiome_model::ExclusionRule;
    use polars::prelude::{NamedFrom, Series};

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("baby".into(), vec!["B001", "B001", "B016", "B034", "B034"]).into(),
            Series::new(
                "time_point".into(),
                vec!["9Monate", "12Monate", "12Monate", "9Monate", "12Monate"],
            )
            .into(),
            Series::new(
                "probe_date_mpi".into(),
                vec![Some("2022-01-01"), Some("2022-04-01"), None, None, None],
            )
            .into(),
            Series::new(
                "weight_mother".into(),
                vec![Some(60.0), None, None, Some(75.0), Some(74.5)],
            )
            .into(),
        ])
        .unwrap()
    }

    #[test]
    fn default_list_removes_known_duplicates() {
        let mut df = frame();
        let removed = apply_exclusions(&mut df, &ExclusionList::default()).unwrap();
        assert_eq!(removed, 3);
        let families = df.column("baby").unwrap().str().unwrap();
        let time_points = df.column("time_point").unwrap().str().unwrap();
        assert_eq!(families.get(0), Some("B001"));
        assert_eq!(time_points.get(0), Some("12Monate"));
        assert_eq!(families.get(1), Some("B034"));
        assert_eq!(time_points.get(1), Some("12Monate"));
    }

    #[test]
    fn not_null_condition_keeps_row_without_value() {
        let mut df = frame();
        df = df.slice(2, 3);
        let list = ExclusionList {
            rules: vec![
                ExclusionRule::new("B016", None)
                    .when(ExclusionCondition::NotNull("probe_date_mpi".to_string())),
            ],
        };
        assert_eq!(apply_exclusions(&mut df, &list).unwrap(), 0);
    }

    #[test]
    fn condition_column_must_exist() {
        let mut df = frame();
        let list = ExclusionList {
            rules: vec![
                ExclusionRule::new("B001", None)
                    .when(ExclusionCondition::NotNull("missing".to_string())),
            ],
        };
        let err = apply_exclusions(&mut df, &list).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { .. }));
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let mut df = frame();
        assert_eq!(apply_exclusions(&mut df, &ExclusionList::empty()).unwrap(), 0);
        assert_eq!(df.height(), 5);
    }
}
