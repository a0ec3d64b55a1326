//! Feeding mode of the baby from the food answer and its note.
//!
//! Twins are assumed to be fed the same way, so only baby1's answer is read.

use std::sync::LazyLock;

use babybiome_model::MemberRole;
use babybiome_model::fields::FEEDING_MODE_COLUMN;
use babybiome_model::notes_column;
use polars::prelude::DataFrame;
use regex::Regex;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{join_tags, join_text, set_bool_column, set_string_column, string_values};

static FORMULA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)milch|pre|aptamil").expect("Invalid formula regex"));
static SOLIDS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)beikost|brei").expect("Invalid solids regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedingFlags {
    pub breastfed: bool,
    pub formula: bool,
    pub solids: bool,
}

impl FeedingFlags {
    /// Modes in fixed order: breastfed, formula, solids.
    pub fn modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.breastfed {
            modes.push("breastfed");
        }
        if self.formula {
            modes.push("formula");
        }
        if self.solids {
            modes.push("solids");
        }
        modes
    }
}

pub fn classify_feeding(text: &str) -> FeedingFlags {
    FeedingFlags {
        breastfed: text.to_lowercase().contains("gestil"),
        formula: FORMULA_REGEX.is_match(text),
        solids: SOLIDS_REGEX.is_match(text),
    }
}

pub struct FeedingModeRule {
    metadata: RuleMetadata,
    food: String,
    food_notes: String,
}

impl FeedingModeRule {
    pub fn new() -> Self {
        let baby1 = MemberRole::Baby1;
        let food = baby1.column("food");
        let food_notes = notes_column(&food);
        let targets = [
            baby1.column("breastfed"),
            baby1.column("formula"),
            baby1.column("solids"),
            FEEDING_MODE_COLUMN.to_string(),
        ];
        Self {
            metadata: RuleMetadata::new(
                "FEEDING_MODE",
                RuleStage::RawText,
                "Classify breastfeeding, formula and solids from the food answer",
            )
            .with_sources(&[food.as_str(), food_notes.as_str()])
            .with_targets(&targets),
            food,
            food_notes,
        }
    }
}

impl Default for FeedingModeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for FeedingModeRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        let food = string_values(df, &self.food, &self.metadata.id)?;
        let notes = string_values(df, &self.food_notes, &self.metadata.id)?;
        let flags: Vec<FeedingFlags> = food
            .iter()
            .zip(&notes)
            .map(|(food, note)| {
                join_text([food.as_deref(), note.as_deref()])
                    .map(|text| classify_feeding(&text))
                    .unwrap_or_default()
            })
            .collect();

        let baby1 = MemberRole::Baby1;
        let breastfed = flags.iter().map(|f| Some(f.breastfed)).collect();
        set_bool_column(df, &baby1.column("breastfed"), breastfed)?;
        let formula = flags.iter().map(|f| Some(f.formula)).collect();
        set_bool_column(df, &baby1.column("formula"), formula)?;
        let solids = flags.iter().map(|f| Some(f.solids)).collect();
        set_bool_column(df, &baby1.column("solids"), solids)?;
        let modes = flags.iter().map(|f| Some(join_tags(&f.modes()))).collect();
        set_string_column(df, FEEDING_MODE_COLUMN, modes)?;
        Ok(())
    }
}
