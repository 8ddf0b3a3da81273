//! Error types for the Tessera library.
//!
//! This crate provides the foundation error types used throughout the Tessera workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tessera_error::{StorageError, StorageErrorKind, TesseraResult};
//!
//! fn size_of(id: &str) -> TesseraResult<u64> {
//!     Err(StorageError::new(StorageErrorKind::NotFound(id.to_string())))?
//! }
//!
//! match size_of("abc123") {
//!     Ok(size) => println!("Size: {}", size),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod storage;

pub use config::ConfigError;
pub use error::{TesseraError, TesseraErrorKind, TesseraResult};
pub use storage::{StorageError, StorageErrorKind};
