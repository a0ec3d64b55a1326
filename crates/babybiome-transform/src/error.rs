use polars::prelude::PolarsError;
use thiserror::Error;

use babybiome_model::MemberRole;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column '{column}' required by {context} is missing")]
    MissingColumn { column: String, context: String },

    #[error("columns for {role} are missing: {}", columns.join(", "))]
    MissingRoleColumns {
        role: MemberRole,
        columns: Vec<String>,
    },

    #[error("renaming '{from}' to '{to}' collides with an existing column")]
    RenameCollision { from: String, to: String },

    #[error("worksheet {sheet}: row {row} has no time point label")]
    MissingTimePoint { sheet: String, row: usize },

    #[error("row {row}: '{column}' is empty but identifies the record")]
    MissingKey { column: String, row: usize },

    #[error("invalid canonicalization pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
