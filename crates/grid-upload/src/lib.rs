//! Chunked upload writer for Grid.
//!
//! An object is written through an [`UploadStream`], which splits the byte
//! stream into fixed-size chunk records, hashes each chunk as it is flushed,
//! and on close inserts a single file record describing the whole object.
//!
//! ```text
//!   write(..) ──► buffer[chunk_size] ──full──► fs.chunks  { files_id, n, data }
//!                      │                           │
//!                      │                           └──► running MD5
//!                    close ──► trailing chunk ──► fs.files { _id, length, chunkSize,
//!                                                            uploadDate, md5, filename,
//!                                                            metadata? }
//!                    abort ──► fs.chunks.delete_many({ files_id })
//! ```
//!
//! # Components
//!
//! - [`UploadStream`] -- the stateful writer: buffering, flush, close/abort
//! - [`ContentDigest`] -- incremental digest fed one chunk at a time
//! - [`UploadConfig`] / [`UploadOptions`] -- bucket-wide and per-upload settings
//! - [`Uploader`] -- opens streams and pumps readers through them

pub mod config;
pub mod digest;
pub mod error;
pub mod stream;
pub mod uploader;

pub use config::{UploadConfig, UploadOptions, DEFAULT_CHUNK_SIZE_BYTES};
pub use digest::{ContentDigest, DigestAlgorithm};
pub use error::{UploadError, UploadResult};
pub use stream::UploadStream;
pub use uploader::Uploader;
