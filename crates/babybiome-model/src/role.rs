//! Family member roles.
//!
//! Every timepoint row describes up to six family members. Each role owns a
//! column suffix in the sheets (`probe_date_sib1`, `bowels_father`, ...) and
//! a single-letter code used in sample identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Father,
    Mother,
    Sibling1,
    Sibling2,
    Baby1,
    Baby2,
}

impl MemberRole {
    /// All roles in fan-out order.
    pub const ALL: [MemberRole; 6] = [
        MemberRole::Father,
        MemberRole::Mother,
        MemberRole::Sibling1,
        MemberRole::Sibling2,
        MemberRole::Baby1,
        MemberRole::Baby2,
    ];

    /// Single-letter code used in `sample_id`.
    pub fn code(self) -> &'static str {
        match self {
            MemberRole::Father => "F",
            MemberRole::Mother => "M",
            MemberRole::Sibling1 => "S",
            MemberRole::Sibling2 => "T",
            MemberRole::Baby1 => "B",
            MemberRole::Baby2 => "C",
        }
    }

    /// Suffix the sheets use for this role's columns.
    pub fn column_suffix(self) -> &'static str {
        match self {
            MemberRole::Father => "father",
            MemberRole::Mother => "mother",
            MemberRole::Sibling1 => "sib1",
            MemberRole::Sibling2 => "sib2",
            MemberRole::Baby1 => "baby1",
            MemberRole::Baby2 => "baby2",
        }
    }

    /// Babies always have a record for every timepoint.
    pub fn is_baby(self) -> bool {
        matches!(self, MemberRole::Baby1 | MemberRole::Baby2)
    }

    /// Build the composite sample identifier `{family}-{code}-{time_point}`.
    pub fn sample_id(self, family: &str, time_point: &str) -> String {
        format!("{family}-{}-{time_point}", self.code())
    }

    /// Build a role-specific column name, e.g. `probe_date` → `probe_date_sib1`.
    pub fn column(self, base: &str) -> String {
        format!("{base}_{}", self.column_suffix())
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_suffix())
    }
}

impl FromStr for MemberRole {
    type Err = ModelError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        MemberRole::ALL
            .into_iter()
            .find(|role| role.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| ModelError::UnknownMemberCode {
                code: code.to_string(),
            })
    }
}
