use crate::error::StoreResult;
use crate::filter::Filter;
use grid_types::Document;

/// A named collection in a document store.
///
/// All implementations must satisfy these invariants:
/// - Each call is atomic: it is either fully applied or not applied at all.
/// - Errors are propagated, never silently ignored or retried.
/// - Documents are opaque apart from filter evaluation.
pub trait Collection: Send + Sync {
    /// The collection name (e.g. `fs.chunks`).
    fn name(&self) -> &str;

    /// Insert a single document.
    fn insert_one(&self, doc: Document) -> StoreResult<()>;

    /// Delete every document matching `filter`. Returns how many were removed.
    ///
    /// Deleting zero documents is a success.
    fn delete_many(&self, filter: &Filter) -> StoreResult<u64>;
}
