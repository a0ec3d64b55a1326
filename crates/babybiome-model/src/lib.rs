//! Data model for the family questionnaire pipeline.
//!
//! - **role**: family member roles and their sample-id codes
//! - **fields**: per-role mapping of logical fields to sheet columns
//! - **mapping**: rename/deletion tables with `_notes` companions
//! - **exclusion**: declarative list of known duplicate samples

pub mod error;
pub mod exclusion;
pub mod fields;
pub mod mapping;
pub mod role;

pub use error::{ModelError, Result};
pub use exclusion::{ExclusionCondition, ExclusionList, ExclusionRule};
pub use fields::{
    BabyDietFields, BabyHealthFields, LAB_DATE_COLUMN, MotherHealthFields, RoleFields,
    SAMPLING_NOTES_COLUMN,
};
pub use mapping::{ColumnMapping, NOTES_SUFFIX, notes_column};
pub use role::MemberRole;
