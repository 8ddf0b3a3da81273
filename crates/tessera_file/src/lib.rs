//! Stored-file handles for Tessera.
//!
//! A [`StoredFile`] names content held by some [`FileBackend`] without
//! owning it. The handle opens a byte stream only when bytes are first
//! needed, answers metadata questions straight from the backend, can
//! materialize the content into a local temporary file, and can produce a
//! signed, deterministic download URL through a [`UrlBuilder`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_file::StoredFile;
//! use tessera_storage::{FileBackend, MemoryBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(MemoryBackend::new());
//! backend.put("abc123", b"hello".to_vec(), "text/plain").await;
//!
//! let mut file = StoredFile::new(backend, "abc123");
//! assert_eq!(file.size().await?, 5);
//! assert_eq!(file.read_to_string().await?, "hello");
//!
//! let copy = file.download().await?;
//! assert_eq!(std::fs::read(copy.path())?, b"hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod file;
mod signer;
mod signed_url;

pub use config::{BackendConfig, TesseraConfig, UrlConfig, DEFAULT_MOUNT_PREFIX};
pub use file::StoredFile;
pub use signer::{Sha256Signer, Signer};
pub use signed_url::{AttachmentMetadata, UrlBuilder, UrlOptions, VerifiedPath};

pub use tessera_storage::{BackendRegistry, ContentStream, FileBackend, LocalCopy};
