//! Questionnaire reshaping and enrichment.
//!
//! Turns the raw worksheet grids into one typed row per family and
//! timepoint, derives features from the free-text answers, and projects the
//! rows into per-member sample records.

pub mod canonical;
pub mod error;
pub mod exclusion;
pub mod fanout;
pub mod frame;
pub mod pipeline;
pub mod rename;
pub mod rules;
pub mod shape;
pub mod table;

pub use canonical::{Canonicalizer, InferredType, infer_type, infer_types};
pub use error::{Result, TransformError};
pub use exclusion::apply_exclusions;
pub use fanout::{
    AntibioticsRecord, BabyDietRecord, HealthRecord, MemberSample, ProbioticsRecord, fan_out,
    validate_roles,
};
pub use frame::LIST_SEPARATOR;
pub use pipeline::{FrameReport, process_frame, tidy_baby_sheets, tidy_general_sheet};
pub use rename::{MappingOutcome, apply_mapping, rename_headers};
pub use rules::{
    FeatureRule, RuleExecutor, RuleMetadata, RuleStage, baby_sheet_rules, general_sheet_rules,
};
pub use shape::{
    FAMILY_COLUMN, TIME_POINT_COLUMN, normalize_baby_sheet, normalize_general_sheet,
    normalize_time_point,
};
pub use table::SheetTable;
