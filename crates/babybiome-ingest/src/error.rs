use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("worksheet '{sheet}' not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("failed to read archive part '{part}' in {path}: {source}")]
    Archive {
        path: PathBuf,
        part: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed XML in '{part}' of {path}: {message}")]
    Xml {
        path: PathBuf,
        part: String,
        message: String,
    },

    #[error("mapping workbook {path} has no '{column}' column")]
    MissingMappingColumn { path: PathBuf, column: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
