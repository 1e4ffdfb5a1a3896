use grid_types::{document_from_value, Document, FileId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Field linking a chunk to its file. Used to build delete filters.
pub const FILES_ID_FIELD: &str = "files_id";

fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    let json = serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(document_from_value(json)?)
}

fn from_document<T: for<'de> Deserialize<'de>>(doc: &Document) -> StoreResult<T> {
    serde_json::from_value(serde_json::Value::Object(doc.clone()))
        .map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// One fixed-size slice of an object's payload.
///
/// Wire shape: `{ files_id, n, data }`. Every chunk of an object except
/// possibly the last carries exactly `chunkSize` bytes; `n` is dense and
/// zero-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub files_id: FileId,
    pub n: u32,
    pub data: Vec<u8>,
}

impl ChunkRecord {
    pub fn new(files_id: FileId, n: u32, data: Vec<u8>) -> Self {
        Self { files_id, n, data }
    }

    /// Encode for insertion into a chunk collection.
    pub fn to_document(&self) -> StoreResult<Document> {
        to_document(self)
    }

    /// Decode a document read back from a chunk collection.
    pub fn from_document(doc: &Document) -> StoreResult<Self> {
        from_document(doc)
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Whole-object metadata, written once the last chunk is persisted.
///
/// Wire shape: `{ _id, length, chunkSize, uploadDate, md5, filename, metadata? }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: FileId,
    pub length: u64,
    #[serde(rename = "chunkSize")]
    pub chunk_size: u32,
    #[serde(rename = "uploadDate")]
    pub upload_date: Timestamp,
    /// Lowercase hex digest of the payload.
    pub md5: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Document>,
}

impl FileRecord {
    /// Build a file record stamped with the current time.
    ///
    /// Empty metadata is dropped so the field is absent on the wire.
    pub fn new(
        id: FileId,
        length: u64,
        chunk_size: u32,
        md5: String,
        filename: impl Into<String>,
        metadata: Option<Document>,
    ) -> Self {
        Self {
            id,
            length,
            chunk_size,
            upload_date: chrono::Utc::now(),
            md5,
            filename: filename.into(),
            metadata: metadata.filter(|m| !m.is_empty()),
        }
    }

    /// Encode for insertion into a file collection.
    pub fn to_document(&self) -> StoreResult<Document> {
        to_document(self)
    }

    /// Decode a document read back from a file collection.
    pub fn from_document(doc: &Document) -> StoreResult<Self> {
        from_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_document_uses_wire_field_names() {
        let id = FileId::new();
        let doc = ChunkRecord::new(id, 2, b"ij".to_vec()).to_document().unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc[FILES_ID_FIELD], json!(id.to_string()));
        assert_eq!(doc["n"], json!(2));
        assert_eq!(doc["data"], json!([b'i', b'j']));
    }

    #[test]
    fn chunk_decodes_from_document() {
        let id = FileId::new();
        let chunk = ChunkRecord::new(id, 7, vec![1, 2, 3]);
        let back = ChunkRecord::from_document(&chunk.to_document().unwrap()).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn file_document_uses_wire_field_names() {
        let id = FileId::new();
        let record = FileRecord::new(id, 10, 4, "abc123".into(), "notes.txt", None);
        let doc = record.to_document().unwrap();
        assert_eq!(doc["_id"], json!(id.to_string()));
        assert_eq!(doc["length"], json!(10));
        assert_eq!(doc["chunkSize"], json!(4));
        assert_eq!(doc["md5"], json!("abc123"));
        assert_eq!(doc["filename"], json!("notes.txt"));
        assert!(doc["uploadDate"].is_string());
        assert!(!doc.contains_key("metadata"));
    }

    #[test]
    fn empty_metadata_is_dropped() {
        let record = FileRecord::new(FileId::new(), 0, 4, String::new(), "x", Some(Document::new()));
        assert!(record.metadata.is_none());
    }

    #[test]
    fn non_empty_metadata_is_kept() {
        let mut meta = Document::new();
        meta.insert("owner".into(), json!("ops"));
        let record = FileRecord::new(FileId::new(), 0, 4, String::new(), "x", Some(meta));
        let doc = record.to_document().unwrap();
        assert_eq!(doc["metadata"], json!({"owner": "ops"}));

        let back = FileRecord::from_document(&doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn malformed_document_is_rejected() {
        let doc = grid_types::document_from_value(json!({"files_id": "nope", "n": 0})).unwrap();
        let err = ChunkRecord::from_document(&doc).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }
}
