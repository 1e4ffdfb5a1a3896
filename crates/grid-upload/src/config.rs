use grid_types::Document;
use serde::{Deserialize, Serialize};

use crate::digest::DigestAlgorithm;
use crate::error::{UploadError, UploadResult};

/// Default chunk size: 255 KiB, so a chunk plus its envelope stays under 256 KiB.
pub const DEFAULT_CHUNK_SIZE_BYTES: u32 = 255 * 1024;

/// Bucket-wide upload settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Payload bytes per chunk record. Must be positive.
    pub chunk_size_bytes: u32,
    /// Name of the digest stored in each file record.
    pub digest: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            digest: DigestAlgorithm::default().name().to_string(),
        }
    }
}

impl UploadConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> UploadResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| UploadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the chunk size and resolve the digest name.
    pub fn validate(&self) -> UploadResult<()> {
        if self.chunk_size_bytes == 0 {
            return Err(UploadError::Config("chunk_size_bytes must be positive".into()));
        }
        self.digest_algorithm()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn digest_algorithm(&self) -> UploadResult<DigestAlgorithm> {
        self.digest.parse()
    }
}

/// Per-upload overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadOptions {
    /// Overrides [`UploadConfig::chunk_size_bytes`] for this upload.
    pub chunk_size_bytes: Option<u32>,
    /// Attached to the file record when non-empty.
    pub metadata: Option<Document>,
}

impl UploadOptions {
    pub fn with_chunk_size(mut self, chunk_size_bytes: u32) -> Self {
        self.chunk_size_bytes = Some(chunk_size_bytes);
        self
    }

    pub fn with_metadata(mut self, metadata: Document) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
