//! Lazy handle over stored content.

use crate::{UrlBuilder, UrlOptions};
use std::sync::Arc;
use tessera_error::{StorageError, StorageErrorKind, TesseraResult};
use tessera_storage::{ContentStream, FileBackend, LocalCopy};
use tokio::io::{AsyncBufReadExt, AsyncReadExt};
use url::Url;

/// Handle to content held by a backend.
///
/// The handle does not own the content: dropping it leaves the stored bytes
/// in place, only [`delete`](Self::delete) removes them.
///
/// The backend is not contacted for bytes until an operation needs them
/// (`read`, `eof`, `as_stream`, `download`). The stream opened then is kept
/// and reused by later byte operations until [`close`](Self::close).
/// Metadata operations go straight to the backend and never open a stream.
///
/// Byte operations take `&mut self`, so sharing one handle between tasks
/// needs external synchronization. Independent handles on the same
/// identifier do not share stream state.
pub struct StoredFile {
    backend: Arc<dyn FileBackend>,
    id: String,
    stream: Option<ContentStream>,
}

impl StoredFile {
    /// Create a handle for existing content.
    pub fn new(backend: Arc<dyn FileBackend>, id: impl Into<String>) -> Self {
        Self {
            backend,
            id: id.into(),
            stream: None,
        }
    }

    /// Identifier of the content within its backend.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Backend holding the content.
    pub fn backend(&self) -> &Arc<dyn FileBackend> {
        &self.backend
    }

    /// Whether a stream is currently open.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn acquire<'a>(
        backend: &Arc<dyn FileBackend>,
        id: &str,
        slot: &'a mut Option<ContentStream>,
    ) -> TesseraResult<&'a mut ContentStream> {
        let stream = match slot.take() {
            Some(stream) => stream,
            None => {
                let stream = backend.open(id).await?;
                tracing::debug!(id, local = stream.is_local(), "Opened content stream");
                stream
            }
        };
        Ok(slot.insert(stream))
    }

    /// Read from the content stream.
    ///
    /// `None` reads everything that remains, `Some(n)` reads at most `n`
    /// bytes. Returns an empty buffer once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Fails with `Stream` if the underlying I/O fails, or with whatever the
    /// backend reports when opening the stream.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn read(&mut self, length: Option<usize>) -> TesseraResult<Vec<u8>> {
        let stream = Self::acquire(&self.backend, &self.id, &mut self.stream).await?;

        let mut buf = Vec::new();
        let result = match length {
            None => stream.read_to_end(&mut buf).await,
            Some(n) => (&mut *stream).take(n as u64).read_to_end(&mut buf).await,
        };
        result.map_err(|e| stream_error(&self.id, e))?;

        Ok(buf)
    }

    /// Read all remaining content as UTF-8.
    pub async fn read_to_string(&mut self) -> TesseraResult<String> {
        let bytes = self.read(None).await?;
        String::from_utf8(bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Stream(format!(
                "{}: content is not UTF-8: {}",
                self.id, e
            )))
            .into()
        })
    }

    /// Whether the stream has been fully consumed.
    pub async fn eof(&mut self) -> TesseraResult<bool> {
        let stream = Self::acquire(&self.backend, &self.id, &mut self.stream).await?;
        let remaining = stream
            .fill_buf()
            .await
            .map_err(|e| stream_error(&self.id, e))?;
        Ok(remaining.is_empty())
    }

    /// Release the stream, if one is open.
    ///
    /// Safe to call at any time and any number of times. A later byte
    /// operation opens a fresh stream from the backend.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(id = %self.id, "Closed content stream");
        }
    }

    /// The lazily opened stream, for callers driving I/O directly.
    pub async fn as_stream(&mut self) -> TesseraResult<&mut ContentStream> {
        Self::acquire(&self.backend, &self.id, &mut self.stream).await
    }

    /// Size of the content in bytes.
    pub async fn size(&self) -> TesseraResult<u64> {
        self.backend.size(&self.id).await
    }

    /// Best-effort media type of the content.
    pub async fn content_type(&self) -> TesseraResult<String> {
        self.backend.content_type(&self.id).await
    }

    /// Permanently remove the content from the backend.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the content is already gone.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn delete(&self) -> TesseraResult<()> {
        self.backend.delete(&self.id).await
    }

    /// Whether the backend still holds the content. Never fails for
    /// missing content.
    pub async fn exists(&self) -> TesseraResult<bool> {
        self.backend.exists(&self.id).await
    }

    /// Materialize the content into a local temporary file.
    ///
    /// If the open stream already reads from a local copy, that copy is
    /// returned as is. Otherwise the rest of the stream is copied into a new
    /// temporary file, which then replaces the stream, so calling this again
    /// neither reopens nor re-copies anything.
    ///
    /// # Errors
    ///
    /// Fails with `Stream` if copying fails. The stream is released in that
    /// case and the next byte operation reopens it.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn download(&mut self) -> TesseraResult<&LocalCopy> {
        let copy = self.materialize().await?;
        self.stream
            .insert(ContentStream::Local(copy))
            .local_copy()
            .ok_or_else(|| stream_error(&self.id, std::io::Error::other("local copy missing")).into())
    }

    /// Materialize the content and hand the local copy to the caller.
    ///
    /// Consumes the handle, so the copy is no longer tied to its stream.
    /// Call [`LocalCopy::keep`] to make the file outlive the copy.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn into_local_copy(mut self) -> TesseraResult<LocalCopy> {
        self.materialize().await
    }

    /// Take the memoized stream, opening one if needed, as a local copy.
    async fn materialize(&mut self) -> TesseraResult<LocalCopy> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.backend.open(&self.id).await?,
        };

        match stream {
            ContentStream::Local(copy) => Ok(copy),
            ContentStream::Reader(mut reader) => {
                let copy = LocalCopy::from_reader(&mut reader)
                    .await
                    .map_err(|e| stream_error(&self.id, e))?;
                tracing::info!(path = %copy.path().display(), "Downloaded content");
                Ok(copy)
            }
        }
    }

    /// Signed download URL for this content.
    pub fn url(&self, builder: &UrlBuilder, options: &UrlOptions<'_>) -> TesseraResult<Url> {
        builder.url(self, options)
    }
}

impl std::fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFile")
            .field("id", &self.id)
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

fn stream_error(id: &str, e: std::io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::Stream(format!("{}: {}", id, e)))
}
