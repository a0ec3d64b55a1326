//! Rule table for feature derivation.
//!
//! Each derived feature is a [`FeatureRule`]: a pure per-row classifier
//! wrapped with metadata naming its source and target columns. The
//! [`RuleExecutor`] checks the sources of every rule before applying it, so
//! a drifted sheet layout fails with the missing column instead of a
//! half-derived frame.
//!
//! Rules run in two stages. `RawText` rules read the free text before the
//! yes/no canonicalization rewrites it; `Typed` rules need the inferred
//! column types (dates).

pub mod birth_weight;
pub mod diet;
pub mod family;
pub mod feeding;
pub mod probiotics;
pub mod smoking;
pub mod travel;

use std::sync::Arc;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::error::Result;
use crate::frame::require_columns;

pub use birth_weight::BirthWeightRule;
pub use diet::{BabyDietRule, FamilyDietRule, classify_diet};
pub use family::{FamilyIdRule, extract_family_id};
pub use feeding::{FeedingFlags, FeedingModeRule, classify_feeding};
pub use probiotics::{ProbioticsFlags, ProbioticsRule, classify_probiotics};
pub use smoking::{SmokingRule, SmokingStatus, classify_smoking};
pub use travel::{TravelTimeRule, travel_days};

/// When a rule runs relative to canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleStage {
    /// Before canonicalization, on the raw answer text.
    RawText,
    /// After column types have been inferred.
    Typed,
}

/// Metadata about a feature rule.
#[derive(Debug, Clone)]
pub struct RuleMetadata {
    pub id: String,
    pub stage: RuleStage,
    pub description: String,
    pub source_columns: Vec<String>,
    pub target_columns: Vec<String>,
}

impl RuleMetadata {
    pub fn new(id: impl Into<String>, stage: RuleStage, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage,
            description: description.into(),
            source_columns: Vec::new(),
            target_columns: Vec::new(),
        }
    }

    pub fn with_sources<S: AsRef<str>>(mut self, sources: &[S]) -> Self {
        self.source_columns = sources.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_targets<S: AsRef<str>>(mut self, targets: &[S]) -> Self {
        self.target_columns = targets.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }
}

/// A derivation applied to the whole frame.
pub trait FeatureRule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    /// Derive the target columns. Sources are checked beforehand.
    fn apply(&self, df: &mut DataFrame) -> Result<()>;
}

/// Executes rules in registration order.
#[derive(Default)]
pub struct RuleExecutor {
    rules: Vec<Arc<dyn FeatureRule>>,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Arc<dyn FeatureRule>) {
        self.rules.push(rule);
    }

    /// Run the rules of `stage`. Returns how many ran.
    pub fn execute(&self, stage: RuleStage, df: &mut DataFrame) -> Result<usize> {
        let mut applied = 0;
        for rule in &self.rules {
            let meta = rule.metadata();
            if meta.stage != stage {
                continue;
            }
            let sources: Vec<&str> = meta.source_columns.iter().map(String::as_str).collect();
            require_columns(df, &sources, &meta.id)?;
            let start = Instant::now();
            rule.apply(df)?;
            debug!(
                rule = %meta.id,
                targets = meta.target_columns.len(),
                duration_ms = start.elapsed().as_millis(),
                "applied rule"
            );
            applied += 1;
        }
        info!(?stage, applied, "feature rules complete");
        Ok(applied)
    }

    pub fn rule_metadata(&self) -> Vec<&RuleMetadata> {
        self.rules.iter().map(|rule| rule.metadata()).collect()
    }
}

/// Rules for the timepoint sheets, in the order they must run.
pub fn baby_sheet_rules() -> RuleExecutor {
    let mut executor = RuleExecutor::new();
    executor.add_rule(Arc::new(BabyDietRule::new()));
    executor.add_rule(Arc::new(FeedingModeRule::new()));
    executor.add_rule(Arc::new(ProbioticsRule::new()));
    executor.add_rule(Arc::new(TravelTimeRule::new()));
    executor
}

/// Rules for the general sheet.
pub fn general_sheet_rules() -> RuleExecutor {
    let mut executor = RuleExecutor::new();
    executor.add_rule(Arc::new(FamilyIdRule::new()));
    executor.add_rule(Arc::new(SmokingRule::new()));
    executor.add_rule(Arc::new(FamilyDietRule::new()));
    executor.add_rule(Arc::new(BirthWeightRule::new()));
    executor
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn baby_rules_are_staged() {
        let executor = baby_sheet_rules();
        let stages: Vec<RuleStage> = executor
            .rule_metadata()
            .iter()
            .map(|meta| meta.stage)
            .collect();
        assert_eq!(
            stages,
            vec![
                RuleStage::RawText,
                RuleStage::RawText,
                RuleStage::RawText,
                RuleStage::Typed
            ]
        );
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut ids = HashSet::new();
        for executor in [baby_sheet_rules(), general_sheet_rules()] {
            for meta in executor.rule_metadata() {
                assert!(ids.insert(meta.id.clone()), "duplicate rule id {}", meta.id);
            }
        }
    }
}
