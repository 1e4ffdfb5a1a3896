use std::io::{self, Read};
use std::sync::Arc;

use grid_store::Collection;
use grid_types::FileId;
use tracing::warn;

use crate::config::{UploadConfig, UploadOptions};
use crate::error::{UploadError, UploadResult};
use crate::stream::UploadStream;

/// Opens upload streams against one pair of file and chunk collections.
pub struct Uploader {
    files: Arc<dyn Collection>,
    chunks: Arc<dyn Collection>,
    config: UploadConfig,
}

impl Uploader {
    /// Uploader with the default configuration (255 KiB chunks, MD5).
    pub fn new(files: Arc<dyn Collection>, chunks: Arc<dyn Collection>) -> Self {
        Self {
            files,
            chunks,
            config: UploadConfig::default(),
        }
    }

    pub fn with_config(
        files: Arc<dyn Collection>,
        chunks: Arc<dyn Collection>,
        config: UploadConfig,
    ) -> UploadResult<Self> {
        config.validate()?;
        Ok(Self {
            files,
            chunks,
            config,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Open a stream under a freshly generated [`FileId`].
    pub fn open_upload_stream(
        &self,
        filename: impl Into<String>,
        options: UploadOptions,
    ) -> UploadResult<UploadStream> {
        self.open_upload_stream_with_id(FileId::new(), filename, options)
    }

    /// Open a stream under a caller-chosen [`FileId`].
    pub fn open_upload_stream_with_id(
        &self,
        file_id: FileId,
        filename: impl Into<String>,
        options: UploadOptions,
    ) -> UploadResult<UploadStream> {
        UploadStream::with_digest(
            Arc::clone(&self.files),
            Arc::clone(&self.chunks),
            file_id,
            filename,
            options.chunk_size_bytes.unwrap_or(self.config.chunk_size_bytes),
            options.metadata,
            &self.config.digest,
        )
    }

    /// Pump `reader` to completion into a new upload and close it.
    ///
    /// If reading or writing fails the upload is aborted before the error is
    /// returned, so no chunks are left behind.
    ///
    /// A store error from the final close is returned without cleanup. The
    /// stream is already closed at that point, so abort is no longer possible
    /// and the chunks already written stay in the chunk collection. The file
    /// id is logged at `warn` so they can be deleted by `files_id`.
    pub fn upload_from_reader<R: Read>(
        &self,
        filename: impl Into<String>,
        mut reader: R,
        options: UploadOptions,
    ) -> UploadResult<FileId> {
        let stream = self.open_upload_stream(filename, options)?;
        let mut buf = vec![0u8; stream.chunk_size_bytes() as usize];

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    abort_quietly(&stream);
                    return Err(UploadError::Source(e));
                }
            };
            if let Err(e) = stream.write(&buf[..n]) {
                abort_quietly(&stream);
                return Err(e);
            }
        }

        stream.close().inspect_err(|e| {
            warn!(file_id = %stream.file_id(), error = %e, "close failed, chunks left behind");
        })?;
        Ok(stream.file_id())
    }
}

fn abort_quietly(stream: &UploadStream) {
    if let Err(e) = stream.abort() {
        warn!(file_id = %stream.file_id(), error = %e, "abort after failed upload also failed");
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("files", &self.files.name())
            .field("chunks", &self.chunks.name())
            .field("config", &self.config)
            .finish()
    }
}
