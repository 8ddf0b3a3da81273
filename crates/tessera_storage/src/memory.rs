//! In-memory content backend.

use crate::{ContentStream, FileBackend, DEFAULT_CONTENT_TYPE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tessera_error::{StorageError, StorageErrorKind, TesseraResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

/// Backend keeping every blob in process memory.
///
/// Content is lost when the backend is dropped. The backend counts how many
/// streams it has opened, which makes it handy for asserting that callers
/// do not re-read content.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    opens: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under a freshly generated identifier.
    pub async fn upload(&self, data: Vec<u8>, content_type: impl Into<String>) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.put(&id, data, content_type).await;
        id
    }

    /// Store `data` under `id`, replacing any previous content.
    #[tracing::instrument(skip(self, data, content_type), fields(size = data.len()))]
    pub async fn put(&self, id: &str, data: Vec<u8>, content_type: impl Into<String>) {
        let mut content_type = content_type.into();
        if content_type.is_empty() {
            content_type = DEFAULT_CONTENT_TYPE.to_string();
        }

        self.blobs.write().await.insert(
            id.to_string(),
            StoredBlob { data, content_type },
        );
        tracing::debug!("Stored blob in memory");
    }

    /// Number of streams opened so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    async fn blob(&self, id: &str) -> TesseraResult<StoredBlob> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id.to_string())).into())
    }
}

#[async_trait::async_trait]
impl FileBackend for MemoryBackend {
    #[tracing::instrument(skip(self))]
    async fn open(&self, id: &str) -> TesseraResult<ContentStream> {
        let blob = self.blob(id).await?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(ContentStream::from_bytes(blob.data))
    }

    async fn size(&self, id: &str) -> TesseraResult<u64> {
        Ok(self.blob(id).await?.data.len() as u64)
    }

    async fn content_type(&self, id: &str) -> TesseraResult<String> {
        Ok(self.blob(id).await?.content_type)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> TesseraResult<()> {
        match self.blobs.write().await.remove(id) {
            Some(_) => {
                tracing::info!("Deleted blob from memory");
                Ok(())
            }
            None => Err(StorageError::new(StorageErrorKind::NotFound(id.to_string())).into()),
        }
    }

    async fn exists(&self, id: &str) -> TesseraResult<bool> {
        Ok(self.blobs.read().await.contains_key(id))
    }
}
