use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid file id: {0}")]
    InvalidFileId(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}
