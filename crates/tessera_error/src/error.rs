//! Top-level error wrapper types.

use crate::{ConfigError, StorageError};

/// Every error a Tessera operation can produce.
///
/// # Examples
///
/// ```
/// use tessera_error::{ConfigError, TesseraError};
///
/// let config_err = ConfigError::new("No host configured");
/// let err: TesseraError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TesseraErrorKind {
    /// Storage or stream error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Tessera error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tessera_error::{TesseraErrorKind, TesseraResult, StorageError, StorageErrorKind};
///
/// fn might_fail() -> TesseraResult<()> {
///     Err(StorageError::new(StorageErrorKind::Stream("broken pipe".into())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), TesseraErrorKind::Storage(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tessera Error: {}", _0)]
pub struct TesseraError(Box<TesseraErrorKind>);

impl TesseraError {
    /// Create a new error from a kind.
    pub fn new(kind: TesseraErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TesseraErrorKind {
        &self.0
    }

    /// Storage error kind, if this is a storage error.
    pub fn storage_kind(&self) -> Option<&crate::StorageErrorKind> {
        match self.kind() {
            TesseraErrorKind::Storage(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// Whether the backend reported missing content.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), TesseraErrorKind::Storage(e) if e.is_not_found())
    }
}

// Generic From implementation for any type that converts to TesseraErrorKind
impl<T> From<T> for TesseraError
where
    T: Into<TesseraErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tessera operations.
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;
