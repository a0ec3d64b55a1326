//! Special diets from free-text food and diet answers.

use babybiome_model::fields::SPECIAL_DIET_BABY_COLUMN;
use babybiome_model::{MemberRole, notes_column};
use polars::prelude::DataFrame;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{join_tags, join_text, set_string_column, string_values};

pub const SPECIAL_DIET_FAMILY_COLUMN: &str = "special_diet_family";

/// Keyword fragments and their tags, in output order.
const DIET_KEYWORDS: [(&str, &str); 7] = [
    ("fleisch", "less meat"),
    ("vege", "vegetarian"),
    ("vega", "vegan"),
    ("salz", "less salt"),
    ("zucker", "low sugar"),
    ("carb", "low carb"),
    ("eiwei", "low protein"),
];

/// Tags for every keyword found in `text`. No match gives an empty list.
pub fn classify_diet(text: &str) -> Vec<&'static str> {
    let text = text.to_lowercase();
    DIET_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, tag)| *tag)
        .collect()
}

/// Concatenate `sources`, store the text in `notes_target` and the tags in
/// `tags_target`.
fn derive_diet(
    df: &mut DataFrame,
    sources: &[String],
    notes_target: &str,
    tags_target: &str,
    rule_id: &str,
) -> Result<()> {
    let columns = sources
        .iter()
        .map(|source| string_values(df, source, rule_id))
        .collect::<Result<Vec<_>>>()?;
    let texts: Vec<Option<String>> = (0..df.height())
        .map(|row| join_text(columns.iter().map(|column| column[row].as_deref())))
        .collect();
    let tags: Vec<Option<String>> = texts
        .iter()
        .map(|text| Some(join_tags(&classify_diet(text.as_deref().unwrap_or_default()))))
        .collect();
    set_string_column(df, notes_target, texts)?;
    set_string_column(df, tags_target, tags)?;
    Ok(())
}

/// Baby diet from both babies' food answers and the diet answer. Twins are
/// assumed to share the diet.
pub struct BabyDietRule {
    metadata: RuleMetadata,
}

impl BabyDietRule {
    pub fn new() -> Self {
        let food1 = MemberRole::Baby1.column("food");
        let food2 = MemberRole::Baby2.column("food");
        let sources = [
            food1.clone(),
            food2.clone(),
            notes_column(&food1),
            notes_column(&food2),
            "diet_baby".to_string(),
            notes_column("diet_baby"),
        ];
        Self {
            metadata: RuleMetadata::new(
                "SPECIAL_DIET_BABY",
                RuleStage::RawText,
                "Tag special baby diets from food and diet answers",
            )
            .with_sources(&sources)
            .with_targets(&[
                notes_column(SPECIAL_DIET_BABY_COLUMN),
                SPECIAL_DIET_BABY_COLUMN.to_string(),
            ]),
        }
    }
}

impl Default for BabyDietRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for BabyDietRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        derive_diet(
            df,
            &self.metadata.source_columns,
            &notes_column(SPECIAL_DIET_BABY_COLUMN),
            SPECIAL_DIET_BABY_COLUMN,
            &self.metadata.id,
        )
    }
}

pub struct FamilyDietRule {
    metadata: RuleMetadata,
}

impl FamilyDietRule {
    pub fn new() -> Self {
        Self {
            metadata: RuleMetadata::new(
                "SPECIAL_DIET_FAMILY",
                RuleStage::RawText,
                "Tag special family diets from the diet answer",
            )
            .with_sources(&["diet_family".to_string(), notes_column("diet_family")])
            .with_targets(&[
                notes_column(SPECIAL_DIET_FAMILY_COLUMN),
                SPECIAL_DIET_FAMILY_COLUMN.to_string(),
            ]),
        }
    }
}

impl Default for FamilyDietRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for FamilyDietRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        derive_diet(
            df,
            &self.metadata.source_columns,
            &notes_column(SPECIAL_DIET_FAMILY_COLUMN),
            SPECIAL_DIET_FAMILY_COLUMN,
            &self.metadata.id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn test_metadata() {
        let rule = BabyDietRule::new();
        assert_eq!(rule.metadata().source_columns.len(), 6);
        assert_eq!(
            rule.metadata().target_columns,
            vec!["special_diet_baby_notes", "special_diet_baby"]
        );
    }

    #[test]
    fn tags_keep_keyword_order() {
        assert_eq!(
            classify_diet("Vegan, wenig Zucker und kein Fleisch"),
            vec!["less meat", "vegan", "low sugar"]
        );
        assert_eq!(classify_diet("Vegetarisch"), vec!["vegetarian"]);
        assert!(classify_diet("normal").is_empty());
    }

    #[test]
    fn family_diet_without_text_is_empty_list() {
        let mut df = DataFrame::new(vec![
            Series::new("diet_family".into(), vec![Some("salzarm"), None]).into(),
            Series::new("diet_family_notes".into(), vec![None::<&str>, None]).into(),
        ])
        .unwrap();
        FamilyDietRule::new().apply(&mut df).unwrap();
        let tags = df.column(SPECIAL_DIET_FAMILY_COLUMN).unwrap().str().unwrap();
        assert_eq!(tags.get(0), Some("less salt"));
        assert_eq!(tags.get(1), Some(""));
        let notes = df.column("special_diet_family_notes").unwrap().str().unwrap();
        assert_eq!(notes.get(0), Some("salzarm"));
        assert_eq!(notes.get(1), None);
    }
}
