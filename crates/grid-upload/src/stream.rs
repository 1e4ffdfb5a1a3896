use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use grid_store::{ChunkRecord, Collection, FileRecord, Filter, FILES_ID_FIELD};
use grid_types::{Document, FileId};
use tracing::{debug, info, warn};

use crate::digest::{ContentDigest, DigestAlgorithm};
use crate::error::{UploadError, UploadResult};

/// Sequential writer that splits a byte stream into fixed-size chunk records.
///
/// Bytes accumulate in a buffer of `chunk_size_bytes`. Each time the buffer
/// fills it is inserted into the chunk collection as `{ files_id, n, data }`
/// and fed to the running digest. [`close`](Self::close) flushes the trailing
/// partial chunk and inserts the file record; [`abort`](Self::abort) deletes
/// every chunk written so far instead.
///
/// Chunk boundaries depend only on the total byte sequence, never on how it
/// was split across `write` calls.
///
/// # Concurrency
///
/// One logical writer drives the stream. Close and abort may race from other
/// threads: the closed flag is checked and set under its own lock, so exactly
/// one of them finalizes. A write that loses a race with close or abort fails
/// with [`UploadError::StreamClosed`].
///
/// # Store failures
///
/// A store error during a mid-stream flush is returned as-is, but the bytes
/// that filled the buffer are already counted in [`length`](Self::length)
/// and still sit in the buffer. The next write or close retries that insert.
/// The intended recovery is [`abort`](Self::abort) and a fresh upload under a
/// new [`FileId`].
pub struct UploadStream {
    files: Arc<dyn Collection>,
    chunks: Arc<dyn Collection>,
    file_id: FileId,
    filename: String,
    chunk_size_bytes: u32,
    metadata: Option<Document>,
    algorithm: DigestAlgorithm,
    closed: Mutex<bool>,
    state: Mutex<WriteState>,
}

struct WriteState {
    /// `None` once the stream is closed or aborted.
    buffer: Option<Vec<u8>>,
    buffer_offset: usize,
    chunk_index: u32,
    length_in_bytes: u64,
    digest: ContentDigest,
}

impl WriteState {
    /// Copy `input` into the buffer, flushing every time it fills.
    fn append(&mut self, mut input: &[u8], chunks: &dyn Collection, file_id: FileId) -> UploadResult<()> {
        while !input.is_empty() {
            let buffer = self.buffer.as_mut().ok_or(UploadError::StreamClosed)?;
            let take = (buffer.len() - self.buffer_offset).min(input.len());
            buffer[self.buffer_offset..self.buffer_offset + take].copy_from_slice(&input[..take]);
            let full = self.buffer_offset + take == buffer.len();

            self.buffer_offset += take;
            self.length_in_bytes += take as u64;
            input = &input[take..];

            if full {
                self.flush(chunks, file_id)?;
            }
        }
        Ok(())
    }

    /// Persist the valid prefix of the buffer as the next chunk.
    ///
    /// No-op on an empty buffer, so an object whose length is a multiple of
    /// the chunk size gets no trailing empty chunk.
    /// Fails with [`UploadError::ChunkLimitExceeded`] without touching the
    /// store when the chunk index cannot advance past `n`.
    fn flush(&mut self, chunks: &dyn Collection, file_id: FileId) -> UploadResult<()> {
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(());
        };
        if self.buffer_offset == 0 {
            return Ok(());
        }

        let data = &buffer[..self.buffer_offset];
        let n = self.chunk_index;
        let next = n.checked_add(1).ok_or(UploadError::ChunkLimitExceeded(n))?;
        let doc = ChunkRecord::new(file_id, n, data.to_vec()).to_document()?;
        chunks.insert_one(doc).inspect_err(|e| {
            warn!(file_id = %file_id, n, error = %e, "chunk insert failed");
        })?;

        self.digest.update(data);
        debug!(file_id = %file_id, n, bytes = self.buffer_offset, "flushed chunk");
        self.chunk_index = next;
        self.buffer_offset = 0;
        Ok(())
    }
}

impl UploadStream {
    /// Open a stream that records an MD5 digest.
    pub fn new(
        files: Arc<dyn Collection>,
        chunks: Arc<dyn Collection>,
        file_id: FileId,
        filename: impl Into<String>,
        chunk_size_bytes: u32,
        metadata: Option<Document>,
    ) -> UploadResult<Self> {
        Self::with_digest(
            files,
            chunks,
            file_id,
            filename,
            chunk_size_bytes,
            metadata,
            DigestAlgorithm::default().name(),
        )
    }

    /// Open a stream recording the digest named `digest`.
    ///
    /// Fails with [`UploadError::DigestUnavailable`] if no such digest exists
    /// and with [`UploadError::InvalidArgument`] if `chunk_size_bytes` is zero.
    pub fn with_digest(
        files: Arc<dyn Collection>,
        chunks: Arc<dyn Collection>,
        file_id: FileId,
        filename: impl Into<String>,
        chunk_size_bytes: u32,
        metadata: Option<Document>,
        digest: &str,
    ) -> UploadResult<Self> {
        let algorithm: DigestAlgorithm = digest.parse()?;
        if chunk_size_bytes == 0 {
            return Err(UploadError::InvalidArgument(
                "chunk size must be positive".into(),
            ));
        }

        Ok(Self {
            files,
            chunks,
            file_id,
            filename: filename.into(),
            chunk_size_bytes,
            metadata,
            algorithm,
            closed: Mutex::new(false),
            state: Mutex::new(WriteState {
                buffer: Some(vec![0u8; chunk_size_bytes as usize]),
                buffer_offset: 0,
                chunk_index: 0,
                length_in_bytes: 0,
                digest: ContentDigest::new(algorithm),
            }),
        })
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn chunk_size_bytes(&self) -> u32 {
        self.chunk_size_bytes
    }

    /// Bytes accepted so far, flushed or not.
    pub fn length(&self) -> u64 {
        self.lock_state().length_in_bytes
    }

    /// Chunk records inserted so far.
    pub fn chunks_written(&self) -> u32 {
        self.lock_state().chunk_index
    }

    pub fn is_closed(&self) -> bool {
        *self.lock_closed()
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Append a whole slice.
    pub fn write(&self, bytes: &[u8]) -> UploadResult<()> {
        self.write_range(bytes, 0, bytes.len())
    }

    /// Append a single byte.
    pub fn write_byte(&self, byte: u8) -> UploadResult<()> {
        self.write_range(&[byte], 0, 1)
    }

    /// Append `length` bytes of `bytes` starting at `offset`.
    ///
    /// A zero `length` succeeds without touching the store.
    pub fn write_range(&self, bytes: &[u8], offset: usize, length: usize) -> UploadResult<()> {
        self.check_closed()?;
        let end = offset
            .checked_add(length)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                UploadError::InvalidArgument(format!(
                    "range {offset}+{length} out of bounds for {} bytes",
                    bytes.len()
                ))
            })?;
        if length == 0 {
            return Ok(());
        }

        self.lock_state()
            .append(&bytes[offset..end], self.chunks.as_ref(), self.file_id)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Flush the trailing chunk and insert the file record.
    ///
    /// Idempotent: only the first call finalizes, later calls return `Ok(())`
    /// without touching the store. The buffer is released either way.
    pub fn close(&self) -> UploadResult<()> {
        if !self.try_mark_closed() {
            return Ok(());
        }

        let mut state = self.lock_state();
        let result = self.finalize(&mut state);
        state.buffer = None;
        result
    }

    fn finalize(&self, state: &mut WriteState) -> UploadResult<()> {
        state.flush(self.chunks.as_ref(), self.file_id)?;

        let digest = std::mem::replace(&mut state.digest, ContentDigest::new(self.algorithm));
        let record = FileRecord::new(
            self.file_id,
            state.length_in_bytes,
            self.chunk_size_bytes,
            digest.finalize_hex(),
            self.filename.clone(),
            self.metadata.clone(),
        );
        self.files.insert_one(record.to_document()?).inspect_err(|e| {
            warn!(file_id = %self.file_id, error = %e, "file record insert failed");
        })?;

        info!(
            file_id = %self.file_id,
            filename = %self.filename,
            length = record.length,
            chunks = state.chunk_index,
            "upload closed"
        );
        Ok(())
    }

    /// Discard the upload: delete every chunk written under this file id.
    ///
    /// Fails with [`UploadError::StreamClosed`] if the stream was already
    /// closed or aborted. No file record is ever inserted afterwards.
    pub fn abort(&self) -> UploadResult<()> {
        if !self.try_mark_closed() {
            return Err(UploadError::StreamClosed);
        }

        {
            let mut state = self.lock_state();
            state.buffer = None;
            state.buffer_offset = 0;
        }

        let deleted = self
            .chunks
            .delete_many(&Filter::eq(FILES_ID_FIELD, self.file_id))
            .inspect_err(|e| {
                warn!(file_id = %self.file_id, error = %e, "chunk cleanup failed");
            })?;
        info!(file_id = %self.file_id, deleted, "upload aborted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    /// Atomically flip `closed` from false to true. Returns whether this call did.
    fn try_mark_closed(&self) -> bool {
        let mut closed = self.lock_closed();
        if *closed {
            return false;
        }
        *closed = true;
        true
    }

    fn check_closed(&self) -> UploadResult<()> {
        if *self.lock_closed() {
            return Err(UploadError::StreamClosed);
        }
        Ok(())
    }

    fn lock_closed(&self) -> MutexGuard<'_, bool> {
        self.closed.lock().expect("lock poisoned")
    }

    fn lock_state(&self) -> MutexGuard<'_, WriteState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl Drop for UploadStream {
    fn drop(&mut self) {
        if let Ok(false) = self.closed.get_mut().map(|closed| *closed) {
            warn!(
                file_id = %self.file_id,
                filename = %self.filename,
                "upload stream dropped without close or abort"
            );
        }
    }
}

impl std::fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadStream")
            .field("file_id", &self.file_id)
            .field("filename", &self.filename)
            .field("chunk_size_bytes", &self.chunk_size_bytes)
            .field("files", &self.files.name())
            .field("chunks", &self.chunks.name())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// std::io::Write
// ---------------------------------------------------------------------------

fn to_io_error(e: UploadError) -> io::Error {
    match e {
        UploadError::StreamClosed => io::Error::new(io::ErrorKind::BrokenPipe, e),
        UploadError::InvalidArgument(_) => io::Error::new(io::ErrorKind::InvalidInput, e),
        UploadError::Source(inner) => inner,
        other => io::Error::other(other),
    }
}

/// Chunk boundaries are fixed by the chunk size, so `flush` does nothing;
/// call [`UploadStream::close`] to persist the trailing chunk.
impl io::Write for &UploadStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        UploadStream::write(*self, buf).map_err(to_io_error)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for UploadStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
