//! Tessera - uniform handles for stored content
//!
//! Tessera lets callers read, inspect, delete, and link to binary content
//! without knowing which storage backend holds it.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera::{BackendRegistry, MemoryBackend, Sha256Signer, StoredFile, UrlBuilder, UrlConfig, UrlOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(MemoryBackend::new());
//! let id = backend.upload(b"hello".to_vec(), "text/plain").await;
//!
//! let mut registry = BackendRegistry::new();
//! registry.register("store", backend.clone())?;
//!
//! let builder = UrlBuilder::new(
//!     Arc::new(registry),
//!     Arc::new(Sha256Signer::new("secret")?),
//!     UrlConfig {
//!         host: Some("https://cdn.example.com".to_string()),
//!         ..UrlConfig::default()
//!     },
//! );
//!
//! let mut file = StoredFile::new(backend, id);
//! assert_eq!(file.read_to_string().await?, "hello");
//!
//! let url = file.url(&builder, &UrlOptions::new().with_format("txt".to_string()))?;
//! println!("Download at {}", url);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `tessera_error` - Error types
//! - `tessera_storage` - Backend contract, reference backends, registry
//! - `tessera_file` - File handles, signing, URL building, configuration
//!
//! This crate re-exports everything for convenience.

pub use tessera_error::*;
pub use tessera_file::*;
pub use tessera_storage::{FileSystemBackend, MemoryBackend, DEFAULT_CONTENT_TYPE};
