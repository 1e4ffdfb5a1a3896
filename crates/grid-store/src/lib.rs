//! Document collection interface for Grid chunked object storage.
//!
//! Grid stores an object as two kinds of documents in two collections:
//! one [`ChunkRecord`] per fixed-size slice of the payload, and one
//! [`FileRecord`] describing the whole object once it is complete. This
//! crate defines the narrow interface Grid needs from a document store and
//! the exact shape of both records.
//!
//! # Storage Backends
//!
//! All backends implement the [`Collection`] trait:
//!
//! - [`InMemoryCollection`] -- `Vec`-backed collection for tests and embedding
//!
//! # Contract
//!
//! 1. `insert_one` and `delete_many` are atomic per call: fully applied or not at all.
//! 2. Failures are returned as [`StoreError`] and never retried here.
//! 3. The store never interprets documents beyond evaluating a [`Filter`].

pub mod error;
pub mod filter;
pub mod memory;
pub mod record;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use memory::InMemoryCollection;
pub use record::{ChunkRecord, FileRecord, FILES_ID_FIELD};
pub use traits::Collection;
