//! Byte streams handed out by backends.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncSeekExt, AsyncWriteExt, BufReader, ReadBuf};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Readable stream over stored content.
///
/// Backends either wrap an arbitrary reader or, when the bytes already live
/// in a local temporary file, hand that file out directly so callers can
/// skip materializing it again.
pub enum ContentStream {
    /// Buffered reader over backend-specific I/O
    Reader(BufReader<BoxedReader>),
    /// Content already materialized into a local temporary file
    Local(LocalCopy),
}

impl ContentStream {
    /// Wrap any reader.
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let boxed: BoxedReader = Box::new(reader);
        Self::Reader(BufReader::new(boxed))
    }

    /// Stream over an owned byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::from_reader(io::Cursor::new(data))
    }

    /// The local temporary copy behind this stream, if any.
    pub fn local_copy(&self) -> Option<&LocalCopy> {
        match self {
            Self::Local(copy) => Some(copy),
            Self::Reader(_) => None,
        }
    }

    /// Whether this stream reads from a local temporary copy.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl From<LocalCopy> for ContentStream {
    fn from(copy: LocalCopy) -> Self {
        Self::Local(copy)
    }
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reader(_) => f.write_str("ContentStream::Reader"),
            Self::Local(copy) => f.debug_tuple("ContentStream::Local").field(copy).finish(),
        }
    }
}

impl AsyncRead for ContentStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Reader(reader) => Pin::new(reader).poll_read(cx, buf),
            Self::Local(copy) => Pin::new(copy).poll_read(cx, buf),
        }
    }
}

impl AsyncBufRead for ContentStream {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        match self.get_mut() {
            Self::Reader(reader) => Pin::new(reader).poll_fill_buf(cx),
            Self::Local(copy) => Pin::new(copy).poll_fill_buf(cx),
        }
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        match self.get_mut() {
            Self::Reader(reader) => Pin::new(reader).consume(amt),
            Self::Local(copy) => Pin::new(copy).consume(amt),
        }
    }
}

/// Content copied into a local temporary file.
///
/// The file is removed when the copy is dropped unless [`keep`](Self::keep)
/// is called.
pub struct LocalCopy {
    reader: BufReader<File>,
    path: TempPath,
}

impl LocalCopy {
    /// Copy everything remaining in `reader` into a fresh temporary file.
    ///
    /// The file is flushed to disk and rewound, so reading the copy starts
    /// at its first byte.
    pub async fn from_reader<R>(reader: &mut R) -> io::Result<Self>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let (file, path) = tempfile::Builder::new()
            .prefix("tessera-")
            .tempfile()?
            .into_parts();
        let mut file = File::from_std(file);

        let copied = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(path = %path.display(), bytes = copied, "Materialized local copy");

        Ok(Self {
            reader: BufReader::new(file),
            path,
        })
    }

    /// Write `data` into a fresh temporary file.
    pub async fn from_bytes(data: &[u8]) -> io::Result<Self> {
        let mut data = data;
        Self::from_reader(&mut data).await
    }

    /// Location of the temporary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop tracking the file so it outlives this value.
    pub fn keep(self) -> io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}

impl std::fmt::Debug for LocalCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCopy")
            .field("path", &self.path())
            .finish()
    }
}

impl AsyncRead for LocalCopy {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl AsyncBufRead for LocalCopy {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().reader).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().reader).consume(amt)
    }
}
