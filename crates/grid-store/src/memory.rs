use std::sync::RwLock;

use grid_types::Document;

use crate::error::StoreResult;
use crate::filter::Filter;
use crate::traits::Collection;

/// In-memory, `Vec`-backed document collection.
///
/// Intended for tests and embedding. Documents are held in insertion order
/// behind a `RwLock` for safe concurrent access and cloned on read.
pub struct InMemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl InMemoryCollection {
    /// Create a new empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.docs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All documents matching `filter`, in insertion order.
    pub fn find(&self, filter: &Filter) -> Vec<Document> {
        self.docs
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect()
    }

    /// Number of documents matching `filter`.
    pub fn count(&self, filter: &Filter) -> usize {
        self.docs
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|doc| filter.matches(doc))
            .count()
    }

    /// Remove all documents.
    pub fn clear(&self) {
        self.docs.write().expect("lock poisoned").clear();
    }
}

impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, doc: Document) -> StoreResult<()> {
        self.docs
            .write()
            .expect("lock poisoned")
            .push(doc);
        Ok(())
    }

    fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        let mut docs = self.docs.write().expect("lock poisoned");
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        let removed = (before - docs.len()) as u64;
        tracing::debug!(collection = %self.name, removed, "deleted documents");
        Ok(removed)
    }
}

impl std::fmt::Debug for InMemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCollection")
            .field("name", &self.name)
            .field("document_count", &self.len())
            .finish()
    }
}
