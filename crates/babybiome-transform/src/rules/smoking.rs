//! Smoking status of the parents.

use std::fmt;

use babybiome_model::{MemberRole, notes_column};
use polars::prelude::DataFrame;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{join_text, set_string_column, string_values};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokingStatus {
    Never,
    No,
    Yes,
    Previously,
}

impl SmokingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SmokingStatus::Never => "never",
            SmokingStatus::No => "no",
            SmokingStatus::Yes => "yes",
            SmokingStatus::Previously => "previously",
        }
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords in priority order. "nie" must win over "ja" in "nie, ja früher".
const SMOKING_KEYWORDS: [(&str, SmokingStatus); 4] = [
    ("nie", SmokingStatus::Never),
    ("nein", SmokingStatus::No),
    ("ja", SmokingStatus::Yes),
    ("früher", SmokingStatus::Previously),
];

/// First matching keyword wins; no match gives `None`.
pub fn classify_smoking(text: &str) -> Option<SmokingStatus> {
    let text = text.to_lowercase();
    SMOKING_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, status)| *status)
}

/// Overwrites `smoking_<parent>` with the status and stores the combined
/// answer and note text in `smoking_<parent>_notes`.
pub struct SmokingRule {
    metadata: RuleMetadata,
    parents: [MemberRole; 2],
}

impl SmokingRule {
    pub fn new() -> Self {
        let parents = [MemberRole::Father, MemberRole::Mother];
        let columns: Vec<String> = parents
            .iter()
            .flat_map(|parent| {
                let answer = parent.column("smoking");
                [notes_column(&answer), answer]
            })
            .collect();
        Self {
            metadata: RuleMetadata::new(
                "SMOKING",
                RuleStage::RawText,
                "Resolve parental smoking status from answer and note",
            )
            .with_sources(&columns)
            .with_targets(&columns),
            parents,
        }
    }
}

impl Default for SmokingRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for SmokingRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        for parent in self.parents {
            let answer_column = parent.column("smoking");
            let notes_name = notes_column(&answer_column);
            let answers = string_values(df, &answer_column, &self.metadata.id)?;
            let notes = string_values(df, &notes_name, &self.metadata.id)?;
            let texts: Vec<Option<String>> = answers
                .iter()
                .zip(&notes)
                .map(|(answer, note)| join_text([answer.as_deref(), note.as_deref()]))
                .collect();
            let statuses = texts
                .iter()
                .map(|text| {
                    text.as_deref()
                        .and_then(classify_smoking)
                        .map(|status| status.as_str().to_string())
                })
                .collect();
            set_string_column(df, &notes_name, texts)?;
            set_string_column(df, &answer_column, statuses)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn test_metadata() {
        let rule = SmokingRule::new();
        assert_eq!(rule.metadata().id, "SMOKING");
        assert!(
            rule.metadata()
                .source_columns
                .contains(&"smoking_mother_notes".to_string())
        );
    }

    #[test]
    fn priority_order() {
        assert_eq!(classify_smoking("nie, ja früher"), Some(SmokingStatus::Never));
        assert_eq!(classify_smoking("Nein"), Some(SmokingStatus::No));
        assert_eq!(classify_smoking("Ja, 5 am Tag"), Some(SmokingStatus::Yes));
        assert_eq!(classify_smoking("früher"), Some(SmokingStatus::Previously));
        assert_eq!(classify_smoking("keine Angabe"), None);
    }

    #[test]
    fn overwrites_answer_and_keeps_text() {
        let mut df = DataFrame::new(vec![
            Series::new("smoking_father".into(), vec![Some("Ja"), None]).into(),
            Series::new("smoking_father_notes".into(), vec![Some("seit 2010"), None]).into(),
            Series::new("smoking_mother".into(), vec![Some("Nie"), Some("xyz")]).into(),
            Series::new("smoking_mother_notes".into(), vec![None::<&str>, None]).into(),
        ])
        .unwrap();
        SmokingRule::new().apply(&mut df).unwrap();
        let father = df.column("smoking_father").unwrap().str().unwrap();
        assert_eq!(father.get(0), Some("yes"));
        assert_eq!(father.get(1), None);
        let notes = df.column("smoking_father_notes").unwrap().str().unwrap();
        assert_eq!(notes.get(0), Some("Ja seit 2010"));
        let mother = df.column("smoking_mother").unwrap().str().unwrap();
        assert_eq!(mother.get(0), Some("never"));
        assert_eq!(mother.get(1), None);
    }
}
