//! Family identifier of the general sheet.
//!
//! The general sheet's family labels carry names and remarks next to the
//! `B###` code ("B001 Müller"); only the code identifies the family.

use std::sync::LazyLock;

use babybiome_model::notes_column;
use polars::prelude::DataFrame;
use regex::Regex;
use tracing::warn;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{has_column, set_string_column, string_values};

pub const GENERAL_FAMILY_COLUMN: &str = "family";

static FAMILY_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"B\d{3}").expect("Invalid family id regex"));

/// First `B###` code in `label`.
pub fn extract_family_id(label: &str) -> Option<String> {
    FAMILY_ID_REGEX
        .find(label)
        .map(|found| found.as_str().to_string())
}

pub struct FamilyIdRule {
    metadata: RuleMetadata,
}

impl FamilyIdRule {
    pub fn new() -> Self {
        Self {
            metadata: RuleMetadata::new(
                "FAMILY_ID",
                RuleStage::RawText,
                "Reduce family labels to their B### code",
            )
            .with_sources(&[GENERAL_FAMILY_COLUMN])
            .with_targets(&[GENERAL_FAMILY_COLUMN]),
        }
    }
}

impl Default for FamilyIdRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for FamilyIdRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        let family_notes = notes_column(GENERAL_FAMILY_COLUMN);
        if has_column(df, &family_notes) {
            df.drop_in_place(&family_notes)?;
        }
        let labels = string_values(df, GENERAL_FAMILY_COLUMN, &self.metadata.id)?;
        let ids: Vec<Option<String>> = labels
            .iter()
            .map(|label| label.as_deref().and_then(extract_family_id))
            .collect();
        let unmatched = labels
            .iter()
            .zip(&ids)
            .filter(|(label, id)| label.is_some() && id.is_none())
            .count();
        if unmatched > 0 {
            warn!(unmatched, "family labels without a B### code");
        }
        set_string_column(df, GENERAL_FAMILY_COLUMN, ids)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn test_metadata() {
        assert_eq!(FamilyIdRule::new().metadata().id, "FAMILY_ID");
    }

    #[test]
    fn extracts_first_code() {
        assert_eq!(extract_family_id("B001 Müller").as_deref(), Some("B001"));
        assert_eq!(extract_family_id("Zwillinge B042/B043").as_deref(), Some("B042"));
        assert_eq!(extract_family_id("b001"), None);
    }

    #[test]
    fn drops_family_notes() {
        let mut df = DataFrame::new(vec![
            Series::new("family".into(), vec![Some("B007 Meier")]).into(),
            Series::new("family_notes".into(), vec![Some("B007 Meier")]).into(),
        ])
        .unwrap();
        FamilyIdRule::new().apply(&mut df).unwrap();
        assert!(!has_column(&df, "family_notes"));
        let family = df.column("family").unwrap().str().unwrap();
        assert_eq!(family.get(0), Some("B007"));
    }
}
