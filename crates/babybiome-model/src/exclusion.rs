//! Known duplicate samples.
//!
//! Some families were entered twice for the same timepoint. The exclusion
//! list names those rows by family, timepoint and an optional condition on
//! another column. The built-in list can be replaced by a TOML file:
//!
//! ```toml
//! [[exclusion]]
//! family = "B001"
//! time_point = "9Monate"
//! when = { not_null = "probe_date_mpi" }
//!
//! [[exclusion]]
//! family = "B034"
//! when = { equals = { column = "weight_mother", value = "75" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::fields::LAB_DATE_COLUMN;

/// Extra predicate a row must satisfy to be excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionCondition {
    /// The column holds a value.
    NotNull(String),
    /// The column's rendered value equals `value`.
    Equals { column: String, value: String },
}

impl ExclusionCondition {
    pub fn column(&self) -> &str {
        match self {
            ExclusionCondition::NotNull(column) => column,
            ExclusionCondition::Equals { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub family: String,
    /// `None` matches every timepoint of the family.
    #[serde(default)]
    pub time_point: Option<String>,
    #[serde(default)]
    pub when: Option<ExclusionCondition>,
}

impl ExclusionRule {
    pub fn new(family: impl Into<String>, time_point: Option<&str>) -> Self {
        Self {
            family: family.into(),
            time_point: time_point.map(str::to_string),
            when: None,
        }
    }

    pub fn when(mut self, condition: ExclusionCondition) -> Self {
        self.when = Some(condition);
        self
    }

    /// Whether the rule's family and timepoint match a row key.
    pub fn matches_key(&self, family: &str, time_point: &str) -> bool {
        self.family == family
            && self
                .time_point
                .as_deref()
                .is_none_or(|expected| expected == time_point)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionList {
    #[serde(rename = "exclusion", default)]
    pub rules: Vec<ExclusionRule>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self {
            rules: vec![
                ExclusionRule::new("B001", Some("9Monate"))
                    .when(ExclusionCondition::NotNull(LAB_DATE_COLUMN.to_string())),
                ExclusionRule::new("B016", Some("12Monate")),
                ExclusionRule::new("B027", Some("12Monate")),
                ExclusionRule::new("B034", None).when(ExclusionCondition::Equals {
                    column: "weight_mother".to_string(),
                    value: "75".to_string(),
                }),
            ],
        }
    }
}

impl ExclusionList {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let list: ExclusionList = toml::from_str(content).map_err(|source| ModelError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        list.validate()?;
        Ok(list)
    }

    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Columns referenced by conditions.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self
            .rules
            .iter()
            .filter_map(|rule| rule.when.as_ref().map(ExclusionCondition::column))
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.family.trim().is_empty() {
                return Err(ModelError::InvalidExclusion {
                    message: format!("entry {} has an empty family", index + 1),
                });
            }
            if let Some(condition) = &rule.when
                && condition.column().trim().is_empty()
            {
                return Err(ModelError::InvalidExclusion {
                    message: format!("entry {} has a condition without a column", index + 1),
                });
            }
        }
        Ok(())
    }
}
