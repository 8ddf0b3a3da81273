//! Tests for signed download URLs.

use std::sync::Arc;
use tessera_error::{StorageErrorKind, TesseraErrorKind};
use tessera_file::{
    AttachmentMetadata, BackendRegistry, FileBackend, Sha256Signer, Signer, StoredFile,
    UrlBuilder, UrlConfig, UrlOptions, VerifiedPath,
};
use tessera_storage::MemoryBackend;

const SECRET: &str = "super-secret";

fn config() -> UrlConfig {
    UrlConfig {
        host: Some("https://cdn.example.com".to_string()),
        mount_prefix: Some("attachments".to_string()),
        secret: Some(SECRET.to_string()),
    }
}

fn setup_with(config: UrlConfig, secret: &str) -> (UrlBuilder, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let mut registry = BackendRegistry::new();
    registry.register("store", backend.clone()).unwrap();

    let builder = UrlBuilder::new(
        Arc::new(registry),
        Arc::new(Sha256Signer::new(secret).unwrap()),
        config,
    );
    (builder, backend)
}

fn setup() -> (UrlBuilder, Arc<MemoryBackend>) {
    setup_with(config(), SECRET)
}

struct Avatar;

impl AttachmentMetadata for Avatar {
    fn basename(&self) -> Option<String> {
        Some("avatar".to_string())
    }

    fn extension(&self) -> Option<String> {
        Some("png".to_string())
    }
}

#[test]
fn test_url_shape() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");

    let url = builder.url(&file, &UrlOptions::new()).unwrap();

    let token = Sha256Signer::new(SECRET).unwrap().sign("/store/abc123/abc123");
    assert_eq!(
        url.as_str(),
        format!("https://cdn.example.com/attachments/{}/store/abc123/abc123", token)
    );
}

#[test]
fn test_url_is_deterministic() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_filename("hello".to_string())
        .with_format("txt".to_string());

    let first = builder.url(&file, &options).unwrap();
    let second = builder.url(&file, &options).unwrap();

    assert_eq!(first.as_str(), second.as_str());
}

#[test]
fn test_format_appended_once() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_filename("report".to_string())
        .with_format("pdf".to_string());

    let url = builder.url(&file, &options).unwrap();

    assert!(url.path().ends_with("/abc123/report.pdf"));
    assert_eq!(url.path().matches(".pdf").count(), 1);
}

#[test]
fn test_empty_format_ignored() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_filename("report".to_string())
        .with_format(String::new());

    let url = builder.url(&file, &options).unwrap();

    assert!(url.path().ends_with("/abc123/report"));
}

#[test]
fn test_filename_escaped() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new().with_filename("my report/final?".to_string());

    let url = builder.url(&file, &options).unwrap();

    assert!(url.path().ends_with("/abc123/my+report%2Ffinal%3F"));
}

#[test]
fn test_extra_segments() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_segments(vec!["fill".to_string(), "300".to_string(), "300".to_string()])
        .with_filename("photo".to_string());

    let url = builder.url(&file, &options).unwrap();

    let token = Sha256Signer::new(SECRET).unwrap().sign("/store/fill/300/300/abc123/photo");
    assert_eq!(
        url.path(),
        format!("/attachments/{}/store/fill/300/300/abc123/photo", token)
    );
}

#[test]
fn test_dot_filename_rejected() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");

    for name in ["..", "."] {
        let options = UrlOptions::new().with_filename(name.to_string());
        let err = builder.url(&file, &options).unwrap_err();
        assert!(matches!(
            err.storage_kind(),
            Some(StorageErrorKind::InvalidSegment(_))
        ));
    }
}

#[test]
fn test_dot_segment_rejected() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_segments(vec!["..".to_string()])
        .with_filename("x".to_string());

    let err = builder.url(&file, &options).unwrap_err();
    assert!(matches!(
        err.storage_kind(),
        Some(StorageErrorKind::InvalidSegment(_))
    ));
}

#[test]
fn test_dot_id_rejected() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "..");
    let options = UrlOptions::new().with_filename("x".to_string());

    let err = builder.url(&file, &options).unwrap_err();
    assert!(matches!(
        err.storage_kind(),
        Some(StorageErrorKind::InvalidSegment(_))
    ));
}

#[test]
fn test_dot_mount_prefix_is_config_error() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new().with_mount_prefix("files/../v1".to_string());

    let err = builder.url(&file, &options).unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[test]
fn test_dotted_names_round_trip() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_segments(vec!["...".to_string()])
        .with_filename("..".to_string())
        .with_format("txt".to_string());

    let url = builder.url(&file, &options).unwrap();

    let token = Sha256Signer::new(SECRET).unwrap().sign("/store/.../abc123/...txt");
    assert_eq!(
        url.path(),
        format!("/attachments/{}/store/.../abc123/...txt", token)
    );
    let verified = builder.verify(url.path()).unwrap();
    assert_eq!(verified.segments, vec!["...".to_string()]);
    assert_eq!(verified.filename, "...txt");
}

#[test]
fn test_attacher_defaults() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");

    let url = builder
        .url(&file, &UrlOptions::new().with_attacher(&Avatar))
        .unwrap();
    assert!(url.path().ends_with("/abc123/avatar.png"));

    let url = builder
        .url(
            &file,
            &UrlOptions::new()
                .with_attacher(&Avatar)
                .with_filename("profile".to_string()),
        )
        .unwrap();
    assert!(url.path().ends_with("/abc123/profile.png"));
}

#[test]
fn test_options_override_config() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_host("http://localhost:3000".to_string())
        .with_mount_prefix("files/v1".to_string());

    let url = builder.url(&file, &options).unwrap();

    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.port(), Some(3000));
    assert!(url.path().starts_with("/files/v1/"));
}

#[test]
fn test_empty_mount_prefix() {
    let mut config = config();
    config.mount_prefix = Some(String::new());
    let (builder, backend) = setup_with(config, SECRET);
    let file = StoredFile::new(backend, "abc123");

    let url = builder.url(&file, &UrlOptions::new()).unwrap();

    let token = Sha256Signer::new(SECRET).unwrap().sign("/store/abc123/abc123");
    assert_eq!(url.path(), format!("/{}/store/abc123/abc123", token));
}

#[test]
fn test_missing_host_is_config_error() {
    let mut config = config();
    config.host = None;
    let (builder, backend) = setup_with(config, SECRET);
    let file = StoredFile::new(backend, "abc123");

    let err = builder.url(&file, &UrlOptions::new()).unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[test]
fn test_missing_mount_prefix_is_config_error() {
    let mut config = config();
    config.mount_prefix = None;
    let (builder, backend) = setup_with(config, SECRET);
    let file = StoredFile::new(backend, "abc123");

    let err = builder.url(&file, &UrlOptions::new()).unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[test]
fn test_invalid_host_is_config_error() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new().with_host("cdn.example.com".to_string());

    let err = builder.url(&file, &options).unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[test]
fn test_unregistered_backend() {
    let (builder, _) = setup();
    let file = StoredFile::new(Arc::new(MemoryBackend::new()), "abc123");

    let err = builder.url(&file, &UrlOptions::new()).unwrap_err();
    assert!(matches!(
        err.storage_kind(),
        Some(StorageErrorKind::UnknownBackend(_))
    ));
}

#[tokio::test]
async fn test_url_does_not_touch_backend() {
    let (builder, backend) = setup();
    backend.put("abc123", b"hello".to_vec(), "text/plain").await;
    let file = StoredFile::new(backend.clone(), "abc123");

    let via_file = file.url(&builder, &UrlOptions::new()).unwrap();
    let via_builder = builder.url(&file, &UrlOptions::new()).unwrap();

    assert_eq!(via_file, via_builder);
    assert!(!file.is_open());
    assert_eq!(backend.open_count(), 0);
}

#[test]
fn test_secret_changes_token() {
    let (builder, backend) = setup();
    let (other_builder, _) = setup_with(config(), "another-secret");
    let backend: Arc<dyn FileBackend> = backend;

    let url = builder.url_for(&backend, "abc123", &UrlOptions::new()).unwrap();
    let other = other_builder
        .url_for(
            other_builder.registry().get("store").unwrap(),
            "abc123",
            &UrlOptions::new(),
        )
        .unwrap();

    assert_ne!(url, other);
    assert!(other_builder.verify(url.path()).is_none());
}

#[test]
fn test_verify_accepts_built_url() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let options = UrlOptions::new()
        .with_segments(vec!["thumb".to_string()])
        .with_filename("my photo".to_string())
        .with_format("jpg".to_string());

    let url = builder.url(&file, &options).unwrap();

    assert_eq!(
        builder.verify(url.path()),
        Some(VerifiedPath {
            backend: "store".to_string(),
            segments: vec!["thumb".to_string()],
            id: "abc123".to_string(),
            filename: "my+photo.jpg".to_string(),
        })
    );
}

#[test]
fn test_verify_rejects_tampering() {
    let (builder, backend) = setup();
    let file = StoredFile::new(backend, "abc123");
    let url = builder.url(&file, &UrlOptions::new()).unwrap();

    let tampered = url.path().replace("/abc123/", "/abc124/");
    assert!(builder.verify(&tampered).is_none());

    let wrong_prefix = url.path().replacen("/attachments/", "/uploads/", 1);
    assert!(builder.verify(&wrong_prefix).is_none());

    assert!(builder.verify("/attachments/token").is_none());
    assert!(builder.verify("").is_none());
}
