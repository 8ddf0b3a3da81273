//! Pluggable content backends for Tessera.
//!
//! This crate defines the contract every storage backend fulfils
//! ([`FileBackend`]), the byte stream a backend hands out
//! ([`ContentStream`]), and an explicit name-to-backend mapping
//! ([`BackendRegistry`]) used when building URLs.
//!
//! Two reference backends are included:
//!
//! - [`MemoryBackend`]: process-local, useful for tests and caches
//! - [`FileSystemBackend`]: sharded directory tree with atomic writes
//!
//! # Example
//!
//! ```rust
//! use tessera_storage::{FileBackend, MemoryBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MemoryBackend::new();
//! let id = backend.upload(b"hello".to_vec(), "text/plain").await;
//!
//! assert_eq!(backend.size(&id).await?, 5);
//! assert_eq!(backend.content_type(&id).await?, "text/plain");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod filesystem;
mod memory;
mod registry;
mod stream;

pub use backend::{FileBackend, DEFAULT_CONTENT_TYPE};
pub use filesystem::FileSystemBackend;
pub use memory::MemoryBackend;
pub use registry::BackendRegistry;
pub use stream::{ContentStream, LocalCopy};
pub use tessera_error::{StorageError, StorageErrorKind};
