use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: duckdb::Error,
    },

    #[error("failed to {action} table {table}: {source}")]
    Schema {
        action: &'static str,
        table: &'static str,
        #[source]
        source: duckdb::Error,
    },

    #[error("failed to insert {sample_id} into {table}: {source}")]
    Insert {
        table: &'static str,
        sample_id: String,
        #[source]
        source: duckdb::Error,
    },

    #[error(transparent)]
    Database(#[from] duckdb::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
