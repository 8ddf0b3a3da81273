//! End-to-end tests over the filesystem backend.

use std::sync::Arc;
use tempfile::TempDir;
use tessera::{
    BackendConfig, FileBackend, FileSystemBackend, StoredFile, TesseraConfig, UrlConfig,
    UrlOptions,
};

#[tokio::test]
async fn test_handle_over_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FileSystemBackend::new(temp_dir.path()).unwrap());
    backend.put("abc123", b"hello", "text/plain").await.unwrap();

    let mut file = StoredFile::new(backend.clone(), "abc123");
    assert_eq!(file.size().await.unwrap(), 5);
    assert_eq!(file.content_type().await.unwrap(), "text/plain");

    let copy = file.download().await.unwrap();
    assert_eq!(tokio::fs::read(copy.path()).await.unwrap(), b"hello");
    assert_eq!(file.read_to_string().await.unwrap(), "hello");

    file.close();
    file.delete().await.unwrap();
    assert!(!file.exists().await.unwrap());
}

#[tokio::test]
async fn test_configured_url_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = TesseraConfig {
        url: UrlConfig {
            host: Some("https://files.example.org".to_string()),
            secret: Some("round-trip".to_string()),
            ..UrlConfig::default()
        },
        ..TesseraConfig::default()
    };
    config.backends.insert(
        "store".to_string(),
        BackendConfig::Filesystem {
            path: temp_dir.path().to_path_buf(),
        },
    );

    let builder = config.url_builder().unwrap();
    let backend: Arc<dyn FileBackend> = builder.registry().get("store").unwrap().clone();
    assert!(!backend.exists("abc123").await.unwrap());

    let file = StoredFile::new(backend, "abc123");
    let url = file
        .url(
            &builder,
            &UrlOptions::new()
                .with_filename("greeting".to_string())
                .with_format("txt".to_string()),
        )
        .unwrap();

    assert!(url.path().starts_with("/attachments/"));
    assert!(url.path().ends_with("/store/abc123/greeting.txt"));

    let verified = builder.verify(url.path()).unwrap();
    assert_eq!(verified.backend, "store");
    assert_eq!(verified.id, "abc123");
    assert_eq!(verified.filename, "greeting.txt");
}
