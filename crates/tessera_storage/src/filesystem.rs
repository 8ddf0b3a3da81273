//! Filesystem-based content backend.
//!
//! Blobs are sharded into two-character subdirectories so no single
//! directory grows without bound.

use crate::{ContentStream, FileBackend, DEFAULT_CONTENT_TYPE};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessera_error::{StorageError, StorageErrorKind, TesseraResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const TYPE_SUFFIX: &str = "type";

/// Filesystem storage backend.
///
/// Stores content in a sharded structure:
/// `{base_path}/{id[0:2]}/{id}` with the media type in a sidecar file
/// `{base_path}/{id[0:2]}/{id}.type`.
///
/// # Example Structure
///
/// ```text
/// /var/tessera/store/
/// ├── ab/
/// │   ├── abcdef123456...
/// │   └── abcdef123456....type
/// └── 12/
///     ├── 123456abcdef...
///     └── 123456abcdef....type
/// ```
///
/// Identifiers may only contain ASCII letters, digits, `-` and `_`, which
/// keeps every lookup inside `base_path`.
///
/// Writes and deletes through one backend (and its clones) are serialized,
/// so a blob and its sidecar always come from the same `put`.
#[derive(Debug, Clone)]
pub struct FileSystemBackend {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSystemBackend {
    /// Create a new filesystem backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> TesseraResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem backend");
        Ok(Self {
            base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Root directory of this backend.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store `data` under the hex SHA-256 of its bytes and return that id.
    ///
    /// Identical content maps to the same identifier.
    pub async fn upload(&self, data: &[u8], content_type: &str) -> TesseraResult<String> {
        let id = Self::compute_hash(data);
        self.put(&id, data, content_type).await?;
        Ok(id)
    }

    /// Store `data` under `id`, replacing any previous content.
    #[tracing::instrument(skip(self, data, content_type), fields(size = data.len()))]
    pub async fn put(&self, id: &str, data: &[u8], content_type: &str) -> TesseraResult<()> {
        let path = self.blob_path(id)?;
        let shard = path.parent().unwrap_or(&self.base_path);

        tokio::fs::create_dir_all(shard).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                shard.display(),
                e
            )))
        })?;

        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        let _guard = self.write_lock.lock().await;
        Self::write_atomic(shard, &path.with_extension(TYPE_SUFFIX), content_type.as_bytes())
            .await?;
        Self::write_atomic(shard, &path, data).await?;

        tracing::info!(path = %path.display(), "Stored blob");
        Ok(())
    }

    /// Write `data` to a uniquely named temp file in `dir`, then rename it
    /// over `dest`.
    async fn write_atomic(dir: &Path, dest: &Path, data: &[u8]) -> TesseraResult<()> {
        let write_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                dest.display(),
                e
            )))
        };

        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".tessera-")
            .tempfile_in(dir)
            .map_err(write_error)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(data).await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        drop(file);

        temp_path.persist(dest).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    /// Structure: `{base}/{id[0:2]}/{id}`
    fn blob_path(&self, id: &str) -> TesseraResult<PathBuf> {
        if !Self::is_valid_id(id) {
            return Err(StorageError::new(StorageErrorKind::InvalidId(id.to_string())).into());
        }
        let shard = id.get(0..2).unwrap_or(id);
        Ok(self.base_path.join(shard).join(id))
    }

    fn map_io(id: &str, path: &Path, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(id.to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    }
}

#[async_trait::async_trait]
impl FileBackend for FileSystemBackend {
    #[tracing::instrument(skip(self))]
    async fn open(&self, id: &str) -> TesseraResult<ContentStream> {
        let path = self.blob_path(id)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| Self::map_io(id, &path, e))?;

        tracing::debug!(path = %path.display(), "Opened blob");
        Ok(ContentStream::from_reader(file))
    }

    #[tracing::instrument(skip(self))]
    async fn size(&self, id: &str) -> TesseraResult<u64> {
        let path = self.blob_path(id)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Self::map_io(id, &path, e))?;
        Ok(metadata.len())
    }

    #[tracing::instrument(skip(self))]
    async fn content_type(&self, id: &str) -> TesseraResult<String> {
        let path = self.blob_path(id)?;
        match tokio::fs::read_to_string(path.with_extension(TYPE_SUFFIX)).await {
            Ok(content_type) => Ok(content_type.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Blobs written by other tools have no sidecar
                if self.exists(id).await? {
                    Ok(DEFAULT_CONTENT_TYPE.to_string())
                } else {
                    Err(StorageError::new(StorageErrorKind::NotFound(id.to_string())).into())
                }
            }
            Err(e) => Err(Self::map_io(id, &path, e).into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> TesseraResult<()> {
        let path = self.blob_path(id)?;
        let _guard = self.write_lock.lock().await;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        match tokio::fs::remove_file(path.with_extension(TYPE_SUFFIX)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                tracing::warn!(error = %e, "Failed to remove content type sidecar");
            }
            _ => {}
        }

        tracing::info!(path = %path.display(), "Deleted blob");
        Ok(())
    }

    async fn exists(&self, id: &str) -> TesseraResult<bool> {
        let Ok(path) = self.blob_path(id) else {
            return Ok(false);
        };
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }
}
