//! Birth weights are entered in grams and reported in kilograms.

use babybiome_ingest::parse_f64;
use babybiome_model::MemberRole;
use polars::prelude::DataFrame;
use tracing::warn;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{set_f64_column, string_values};

const GRAMS_PER_KILOGRAM: f64 = 1000.0;

pub struct BirthWeightRule {
    metadata: RuleMetadata,
    columns: Vec<String>,
}

impl BirthWeightRule {
    pub fn new() -> Self {
        let columns: Vec<String> = [MemberRole::Baby1, MemberRole::Baby2]
            .iter()
            .map(|baby| format!("weight_{}_at_birth", baby.column_suffix()))
            .collect();
        Self {
            metadata: RuleMetadata::new(
                "BIRTH_WEIGHT",
                RuleStage::RawText,
                "Convert birth weights from grams to kilograms",
            )
            .with_sources(&columns)
            .with_targets(&columns),
            columns,
        }
    }
}

impl Default for BirthWeightRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for BirthWeightRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        for column in &self.columns {
            let raw = string_values(df, column, &self.metadata.id)?;
            let mut unparsed = 0usize;
            let kilograms = raw
                .iter()
                .map(|value| {
                    let value = value.as_deref()?;
                    let grams = parse_f64(&value.replace(',', "."));
                    if grams.is_none() {
                        unparsed += 1;
                    }
                    grams.map(|grams| grams / GRAMS_PER_KILOGRAM)
                })
                .collect();
            if unparsed > 0 {
                warn!(column = %column, unparsed, "non-numeric birth weights set to null");
            }
            set_f64_column(df, column, kilograms)?;
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
        let rule = BirthWeightRule::new();
        assert_eq!(
            rule.metadata().source_columns,
            vec!["weight_baby1_at_birth", "weight_baby2_at_birth"]
        );
    }

    #[test]
    fn grams_to_kilograms() {
        let mut df = DataFrame::new(vec![
            Series::new("weight_baby1_at_birth".into(), vec![Some("3450"), Some("?"), None]).into(),
            Series::new("weight_baby2_at_birth".into(), vec![None::<&str>, None, None]).into(),
        ])
        .unwrap();
        BirthWeightRule::new().apply(&mut df).unwrap();
        let weights = df.column("weight_baby1_at_birth").unwrap().f64().unwrap();
        assert_eq!(weights.get(0), Some(3.45));
        assert_eq!(weights.get(1), None);
        assert_eq!(weights.get(2), None);
    }
}
