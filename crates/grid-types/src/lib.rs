//! Foundation types for Grid chunked object storage.
//!
//! Every other Grid crate depends on `grid-types`.
//!
//! # Key Types
//!
//! - [`FileId`] -- UUID v7 identifier shared by a file record and all of its chunks
//! - [`Document`] -- JSON object, the unit the document store persists
//! - [`Timestamp`] -- UTC wall-clock instant recorded as `uploadDate`

pub mod document;
pub mod error;
pub mod file_id;

pub use document::{document_from_value, Document, Timestamp};
pub use error::TypeError;
pub use file_id::FileId;
