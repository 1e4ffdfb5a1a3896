/// Errors from document collection operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored document does not have the expected shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl From<grid_types::TypeError> for StoreError {
    fn from(e: grid_types::TypeError) -> Self {
        Self::InvalidDocument(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
