//! Backend contract definition.

use crate::ContentStream;
use tessera_error::TesseraResult;

/// Media type reported when a backend has no better information.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Trait for pluggable content storage backends.
///
/// Every operation is keyed by an opaque identifier that is unique within
/// the backend. Implementations report missing content as
/// `StorageErrorKind::NotFound`, except [`exists`](FileBackend::exists),
/// which answers `false` instead.
#[async_trait::async_trait]
pub trait FileBackend: Send + Sync {
    /// Open a readable stream over the stored bytes.
    async fn open(&self, id: &str) -> TesseraResult<ContentStream>;

    /// Size of the stored content in bytes.
    async fn size(&self, id: &str) -> TesseraResult<u64>;

    /// Best-effort media type of the stored content.
    async fn content_type(&self, id: &str) -> TesseraResult<String>;

    /// Permanently remove the stored content.
    ///
    /// Removing an identifier that is already absent fails with `NotFound`.
    async fn delete(&self, id: &str) -> TesseraResult<()>;

    /// Check whether content exists for the identifier.
    async fn exists(&self, id: &str) -> TesseraResult<bool>;
}
