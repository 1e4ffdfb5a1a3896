use grid_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The content digest could not be instantiated. Fatal, raised at construction.
    #[error("digest unavailable, cannot upload file: {0}")]
    DigestUnavailable(String),

    #[error("the upload stream has been closed")]
    StreamClosed,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Chunk index `n` is the last one a file can hold; no further chunk fits.
    #[error("chunk limit exceeded: no chunk can follow n = {0}")]
    ChunkLimitExceeded(u32),

    /// Propagated verbatim from the chunk or file collection.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Reading the source failed while pumping it into a stream.
    #[error("source read failed: {0}")]
    Source(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type UploadResult<T> = Result<T, UploadError>;
