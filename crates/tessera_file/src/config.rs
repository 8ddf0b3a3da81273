//! Configuration for backends and download URLs.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (tessera.toml shipped with the library)
//! 2. User config in home directory (~/.config/tessera/tessera.toml)
//! 3. User config in current directory (./tessera.toml)
//! 4. Environment variables prefixed `TESSERA`, nested with `__`
//!    (e.g. `TESSERA_URL__HOST=https://cdn.example.com`)

use crate::{Sha256Signer, UrlBuilder};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tessera_error::{ConfigError, TesseraError, TesseraResult};
use tessera_storage::{BackendRegistry, FileBackend, FileSystemBackend, MemoryBackend};
use tracing::{debug, instrument};

/// Mount prefix used when configuration names none.
pub const DEFAULT_MOUNT_PREFIX: &str = "attachments";

fn default_mount_prefix() -> Option<String> {
    Some(DEFAULT_MOUNT_PREFIX.to_string())
}

/// Defaults for download URLs.
///
/// ```toml
/// [url]
/// host = "https://cdn.example.com"
/// mount_prefix = "attachments"
/// secret = "change-me"
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlConfig {
    /// Scheme and authority URLs are built on
    #[serde(default)]
    pub host: Option<String>,

    /// Path segments preceding the token; empty for none
    #[serde(default = "default_mount_prefix")]
    pub mount_prefix: Option<String>,

    /// Key for signing URL paths
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            host: None,
            mount_prefix: default_mount_prefix(),
            secret: None,
        }
    }
}

impl std::fmt::Debug for UrlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlConfig")
            .field("host", &self.host)
            .field("mount_prefix", &self.mount_prefix)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for one named backend.
///
/// ```toml
/// [backends.store]
/// kind = "filesystem"
/// path = "/var/lib/tessera"
///
/// [backends.cache]
/// kind = "memory"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// [`FileSystemBackend`] rooted at `path`
    Filesystem {
        /// Root directory
        path: PathBuf,
    },
    /// Empty [`MemoryBackend`]
    Memory,
}

impl BackendConfig {
    /// Construct the configured backend.
    pub fn build(&self) -> TesseraResult<Arc<dyn FileBackend>> {
        let backend: Arc<dyn FileBackend> = match self {
            Self::Filesystem { path } => Arc::new(FileSystemBackend::new(path.clone())?),
            Self::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(backend)
    }
}

/// Top-level Tessera configuration.
///
/// # Example
///
/// ```no_run
/// use tessera_file::TesseraConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TesseraConfig::load()?;
/// let builder = config.url_builder()?;
/// println!("Backends: {:?}", builder.registry().names().collect::<Vec<_>>());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct TesseraConfig {
    /// URL defaults
    #[serde(default)]
    pub url: UrlConfig,

    /// Backends by name
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
}

impl TesseraConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> TesseraResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence:
    /// environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> TesseraResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../tessera.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tessera/tessera.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("tessera").required(false))
            .add_source(
                Environment::with_prefix("TESSERA")
                    .prefix_separator("_")
                    .separator("__"),
            );

        builder
            .build()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Construct every configured backend and register it by name.
    pub fn registry(&self) -> TesseraResult<BackendRegistry> {
        let mut registry = BackendRegistry::new();
        for (name, backend) in &self.backends {
            registry.register(name.clone(), backend.build()?)?;
        }
        Ok(registry)
    }

    /// Signer keyed by the configured secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no secret is configured.
    pub fn signer(&self) -> TesseraResult<Sha256Signer> {
        let secret = self
            .url
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::new("No secret configured for signing URLs"))?;
        Ok(Sha256Signer::new(secret)?)
    }

    /// URL builder over the configured backends, secret and URL defaults.
    pub fn url_builder(&self) -> TesseraResult<UrlBuilder> {
        Ok(UrlBuilder::new(
            Arc::new(self.registry()?),
            Arc::new(self.signer()?),
            self.url.clone(),
        ))
    }
}
