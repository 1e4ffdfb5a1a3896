use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};

use crate::error::UploadError;

/// Digest algorithm recorded in a file record's `md5` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[default]
    Md5,
}

impl DigestAlgorithm {
    /// Canonical lowercase name, as accepted by configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            other => Err(UploadError::DigestUnavailable(format!(
                "no {other:?} message digest available"
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Incremental content digest.
///
/// Fed one flushed chunk at a time, in chunk order, so memory stays bounded
/// by the chunk size no matter how large the object is.
pub struct ContentDigest {
    inner: Md5,
}

impl ContentDigest {
    /// Instantiate a fresh accumulator for `algorithm`.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self { inner: Md5::new() },
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Consume the accumulator and return the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentDigest").finish_non_exhaustive()
    }
}
