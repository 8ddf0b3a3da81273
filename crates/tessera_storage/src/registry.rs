//! Named backend registry.

use crate::FileBackend;
use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_error::{StorageError, StorageErrorKind, TesseraResult};

/// Mapping between backend names and backend instances.
///
/// Lookup works both ways: by name, and from an instance back to the name
/// it was registered under. Reverse lookup compares instance identity, not
/// contents, so two separately constructed backends with the same settings
/// are distinct.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tessera_storage::{BackendRegistry, FileBackend, MemoryBackend};
///
/// let cache: Arc<dyn FileBackend> = Arc::new(MemoryBackend::new());
/// let mut registry = BackendRegistry::new();
/// registry.register("cache", cache.clone()).unwrap();
///
/// assert_eq!(registry.name_of(&cache), Some("cache"));
/// assert!(registry.get("store").is_none());
/// ```
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn FileBackend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` under `name`.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidConfig` if the name is empty, contains `/`, or is
    /// already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        backend: Arc<dyn FileBackend>,
    ) -> TesseraResult<()> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "invalid backend name {:?}",
                name
            )))
            .into());
        }
        if self.backends.contains_key(&name) {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "backend {} is already registered",
                name
            )))
            .into());
        }

        tracing::debug!(backend = %name, "Registered backend");
        self.backends.insert(name, backend);
        Ok(())
    }

    /// Backend registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn FileBackend>> {
        self.backends.get(name)
    }

    /// Name the given backend instance was registered under.
    pub fn name_of(&self, backend: &Arc<dyn FileBackend>) -> Option<&str> {
        let target = Arc::as_ptr(backend) as *const ();
        self.backends
            .iter()
            .find(|&(_, candidate)| Arc::as_ptr(candidate) as *const () == target)
            .map(|(name, _)| name.as_str())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}
