//! Signed download URL construction.
//!
//! URLs have the shape
//! `/<mount prefix...>/<token>/<backend>/<segment...>/<id>/<filename>[.<format>]`
//! on a configured host, where `token` signs everything after it. Building
//! never contacts the backend and involves no clock or randomness, so equal
//! inputs always give byte-identical URLs.

use crate::{Signer, StoredFile, UrlConfig};
use std::sync::Arc;
use tessera_error::{ConfigError, StorageError, StorageErrorKind, TesseraResult};
use tessera_storage::{BackendRegistry, FileBackend};
use url::{form_urlencoded, Url};

/// Source of filename defaults for URLs, typically the record a file is
/// attached to.
pub trait AttachmentMetadata {
    /// Filename without extension.
    fn basename(&self) -> Option<String> {
        None
    }

    /// Extension without the leading dot.
    fn extension(&self) -> Option<String> {
        None
    }
}

/// Per-call overrides for [`UrlBuilder::url`].
///
/// # Example
///
/// ```
/// use tessera_file::UrlOptions;
///
/// let options = UrlOptions::new()
///     .with_filename("report".to_string())
///     .with_format("pdf".to_string());
/// assert_eq!(options.format.as_deref(), Some("pdf"));
/// ```
#[derive(Default, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct UrlOptions<'a> {
    /// Host overriding the configured one
    pub host: Option<String>,
    /// Mount prefix overriding the configured one
    pub mount_prefix: Option<String>,
    /// Filename overriding the attacher's basename and the file id
    pub filename: Option<String>,
    /// Extension overriding the attacher's
    pub format: Option<String>,
    /// Extra path segments placed between backend name and id
    pub segments: Vec<String>,
    /// Filename defaults
    #[setters(skip)]
    pub attacher: Option<&'a dyn AttachmentMetadata>,
}

impl<'a> UrlOptions<'a> {
    /// Options with every value taken from configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take filename defaults from `attacher`.
    pub fn with_attacher(mut self, attacher: &'a dyn AttachmentMetadata) -> Self {
        self.attacher = Some(attacher);
        self
    }
}

/// Path components recovered from a URL whose token checked out.
///
/// Values appear as escaped in the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerifiedPath {
    /// Registered backend name
    pub backend: String,
    /// Extra segments between backend name and id
    pub segments: Vec<String>,
    /// Content identifier
    pub id: String,
    /// Filename including any format extension
    pub filename: String,
}

/// Builds signed download URLs.
///
/// Host and mount prefix come from the call's [`UrlOptions`] first and the
/// injected [`UrlConfig`] second; when neither supplies one the build fails
/// with a configuration error. The backend's name is looked up in the
/// injected registry.
#[derive(Clone)]
pub struct UrlBuilder {
    registry: Arc<BackendRegistry>,
    signer: Arc<dyn Signer>,
    config: UrlConfig,
}

impl UrlBuilder {
    /// Create a builder.
    pub fn new(registry: Arc<BackendRegistry>, signer: Arc<dyn Signer>, config: UrlConfig) -> Self {
        Self {
            registry,
            signer,
            config,
        }
    }

    /// Registry used for backend name lookup.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Configuration defaults.
    pub fn config(&self) -> &UrlConfig {
        &self.config
    }

    /// Signed URL for a stored file.
    pub fn url(&self, file: &StoredFile, options: &UrlOptions<'_>) -> TesseraResult<Url> {
        self.url_for(file.backend(), file.id(), options)
    }

    /// Signed URL for content `id` in `backend`.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if no host or mount prefix can be resolved, or the
    ///   host is not an absolute URL
    /// - `InvalidSegment` if the id, filename or an extra segment is `.` or
    ///   `..`, which URL parsing would collapse out of the path
    /// - `UnknownBackend` if `backend` is not in the registry
    #[tracing::instrument(skip(self, backend, options))]
    pub fn url_for(
        &self,
        backend: &Arc<dyn FileBackend>,
        id: &str,
        options: &UrlOptions<'_>,
    ) -> TesseraResult<Url> {
        let host = options
            .host
            .as_deref()
            .or(self.config.host.as_deref())
            .ok_or_else(|| ConfigError::new("No host configured for download URLs"))?;
        let mount_prefix = options
            .mount_prefix
            .as_deref()
            .or(self.config.mount_prefix.as_deref())
            .ok_or_else(|| ConfigError::new("No mount prefix configured for download URLs"))?;
        if prefix_segments(mount_prefix).any(is_dot_segment) {
            return Err(ConfigError::new(format!(
                "Mount prefix {} contains a dot segment",
                mount_prefix
            ))
            .into());
        }

        let mut filename = options
            .filename
            .clone()
            .or_else(|| options.attacher.and_then(|a| a.basename()))
            .unwrap_or_else(|| id.to_string());
        let format = options
            .format
            .clone()
            .or_else(|| options.attacher.and_then(|a| a.extension()));
        if let Some(format) = format.filter(|f| !f.is_empty()) {
            filename.push('.');
            filename.push_str(&format);
        }

        if let Some(segment) = options
            .segments
            .iter()
            .map(String::as_str)
            .chain([id, filename.as_str()])
            .find(|s| is_dot_segment(s))
        {
            return Err(StorageError::new(StorageErrorKind::InvalidSegment(format!(
                "{:?} in URL for {}",
                segment, id
            )))
            .into());
        }

        let backend_name = self.registry.name_of(backend).ok_or_else(|| {
            StorageError::new(StorageErrorKind::UnknownBackend(format!(
                "no registered backend holds {}",
                id
            )))
        })?;

        let mut base_path = String::new();
        push_segment(&mut base_path, backend_name);
        for segment in &options.segments {
            push_segment(&mut base_path, segment);
        }
        push_segment(&mut base_path, id);
        push_segment(&mut base_path, &filename);

        let token = self.signer.sign(&base_path);

        let mut path = String::new();
        for segment in prefix_segments(mount_prefix) {
            push_segment(&mut path, segment);
        }
        push_segment(&mut path, &token);
        path.push_str(&base_path);

        let mut url = Url::parse(host)
            .map_err(|e| ConfigError::new(format!("Invalid host {}: {}", host, e)))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::new(format!("Host {} cannot carry a path", host)).into());
        }
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);

        tracing::debug!(backend = backend_name, url = %url, "Built download URL");
        Ok(url)
    }

    /// Check the token in a URL path built by this builder.
    ///
    /// The path must start with the configured mount prefix. Returns `None`
    /// for paths that are malformed or whose token does not match.
    pub fn verify(&self, path: &str) -> Option<VerifiedPath> {
        let mut segments = path.strip_prefix('/')?.split('/');
        let mount_prefix = self.config.mount_prefix.as_deref().unwrap_or_default();
        for expected in prefix_segments(mount_prefix) {
            if segments.next()? != escape(expected) {
                return None;
            }
        }

        let token = segments.next()?;
        let rest: Vec<&str> = segments.collect();
        if rest.len() < 3 {
            return None;
        }

        let base_path = format!("/{}", rest.join("/"));
        if !self.signer.verify(&base_path, token) {
            tracing::warn!(path = %base_path, "Rejected download URL with invalid token");
            return None;
        }

        let (backend, tail) = rest.split_first()?;
        let (filename, tail) = tail.split_last()?;
        let (id, extra) = tail.split_last()?;
        Some(VerifiedPath {
            backend: backend.to_string(),
            segments: extra.iter().map(|s| s.to_string()).collect(),
            id: id.to_string(),
            filename: filename.to_string(),
        })
    }
}

impl std::fmt::Debug for UrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn prefix_segments(prefix: &str) -> impl Iterator<Item = &str> {
    prefix.split('/').filter(|s| !s.is_empty())
}

/// `.` and `..` survive form escaping but are removed by URL path
/// normalization, as are their percent-encoded forms.
fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

fn push_segment(path: &mut String, segment: &str) {
    path.push('/');
    path.push_str(&escape(segment));
}

/// Form-style escaping; spaces become `+`.
fn escape(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape("my file.txt"), "my+file.txt");
        assert_eq!(escape("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(escape("café"), "caf%C3%A9");
    }

    #[test]
    fn detects_dot_segments() {
        assert!(is_dot_segment("."));
        assert!(is_dot_segment(".."));
        assert!(!is_dot_segment("..."));
        assert!(!is_dot_segment(".hidden"));
        assert_eq!(escape(".."), "..");
    }

    #[test]
    fn splits_mount_prefix() {
        let segments: Vec<_> = prefix_segments("/files//v1/").collect();
        assert_eq!(segments, vec!["files", "v1"]);
        assert_eq!(prefix_segments("").count(), 0);
    }
}
