//! Stored-file command handlers.

use super::FileArgs;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tessera::{
    BackendRegistry, StorageError, StorageErrorKind, StoredFile, TesseraResult, UrlBuilder,
    UrlOptions,
};

fn open(registry: &BackendRegistry, args: &FileArgs) -> TesseraResult<StoredFile> {
    let backend = registry.get(&args.backend).ok_or_else(|| {
        StorageError::new(StorageErrorKind::UnknownBackend(format!(
            "{} (configured: {})",
            args.backend,
            registry.names().collect::<Vec<_>>().join(", ")
        )))
    })?;
    Ok(StoredFile::new(backend.clone(), args.id.clone()))
}

/// Print a signed download URL.
pub fn url(builder: &UrlBuilder, args: &FileArgs, options: &UrlOptions<'_>) -> TesseraResult<()> {
    let file = open(builder.registry(), args)?;
    println!("{}", file.url(builder, options)?);
    Ok(())
}

/// Stream content to stdout.
#[tracing::instrument(skip(registry))]
pub async fn cat(registry: &BackendRegistry, args: &FileArgs) -> TesseraResult<()> {
    let mut file = open(registry, args)?;
    let mut stdout = tokio::io::stdout();

    let stream = file.as_stream().await?;
    tokio::io::copy(stream, &mut stdout)
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Stream(e.to_string())))?;
    stdout
        .flush()
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Stream(e.to_string())))?;
    Ok(())
}

/// Print existence, size and media type.
#[tracing::instrument(skip(registry))]
pub async fn stat(registry: &BackendRegistry, args: &FileArgs) -> TesseraResult<()> {
    let file = open(registry, args)?;

    if !file.exists().await? {
        println!("{}/{}: not found", args.backend, args.id);
        return Ok(());
    }

    println!("{}/{}", args.backend, args.id);
    println!("  size: {} bytes", file.size().await?);
    println!("  type: {}", file.content_type().await?);
    Ok(())
}

/// Materialize content and print where it landed.
///
/// Without `output` the temporary copy is kept and its path printed.
#[tracing::instrument(skip(registry))]
pub async fn download(
    registry: &BackendRegistry,
    args: &FileArgs,
    output: Option<PathBuf>,
) -> TesseraResult<PathBuf> {
    let copy = open(registry, args)?.into_local_copy().await?;

    let path = match output {
        Some(output) => {
            tokio::fs::copy(copy.path(), &output).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    output.display(),
                    e
                )))
            })?;
            output
        }
        None => copy.keep().map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "keep local copy of {}: {}",
                args.id, e
            )))
        })?,
    };

    println!("{}", path.display());
    Ok(path)
}

/// Delete content.
#[tracing::instrument(skip(registry))]
pub async fn delete(registry: &BackendRegistry, args: &FileArgs) -> TesseraResult<()> {
    let file = open(registry, args)?;
    file.delete().await?;
    println!("Deleted {}/{}", args.backend, args.id);
    Ok(())
}
