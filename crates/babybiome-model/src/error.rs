use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid exclusion entry: {message}")]
    InvalidExclusion { message: String },

    #[error("unknown member code: {code}")]
    UnknownMemberCode { code: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
