// Error types for extraction, schema construction, config and storage
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while turning a PDF into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot open document {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("page {index} out of range (document has {page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },

    #[error("text layer of page {page} could not be decoded: {reason}")]
    TextLayer { page: usize, reason: String },

    #[error("rendering page {page} failed: {reason}")]
    Render { page: usize, reason: String },

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("extraction worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Errors that only cost the current page its text. Everything else
    /// aborts the batch and with it the whole document.
    pub fn is_page_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::TextLayer { .. } | ExtractError::Render { .. } | ExtractError::Ocr(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field name {0:?} is not a valid column identifier")]
    InvalidFieldName(String),

    #[error("field {0:?} is declared twice")]
    DuplicateField(String),

    #[error("field {0:?} has no label variants")]
    NoLabels(String),

    #[error("label overrides name unknown field {0:?}")]
    UnknownField(String),

    #[error("pattern for field {field:?} label {label:?} failed to compile: {source}")]
    Pattern {
        field: String,
        label: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {name} has invalid value {value:?}")]
    Env { name: &'static str, value: String },

    #[error("{0} must be at least 1")]
    ZeroTunable(&'static str),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("record has {got} fields but the table was created for {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("table has not been created yet")]
    TableMissing,
}
