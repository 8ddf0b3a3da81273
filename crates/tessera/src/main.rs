//! Tessera CLI binary.
//!
//! This binary provides command-line access to configured backends:
//! - Build signed download URLs
//! - Inspect, print, copy and delete stored content

use clap::Parser;
use tessera::{TesseraConfig, UrlOptions};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands};

    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => TesseraConfig::from_file(path)?,
        None => TesseraConfig::load()?,
    };

    // Execute the requested command
    match cli.command {
        Commands::Url {
            file,
            filename,
            format,
            host,
            prefix,
            segments,
        } => {
            let options = UrlOptions {
                host,
                mount_prefix: prefix,
                filename,
                format,
                segments,
                attacher: None,
            };
            cli::url(&config.url_builder()?, &file, &options)?;
        }

        Commands::Cat { file } => {
            cli::cat(&config.registry()?, &file).await?;
        }

        Commands::Stat { file } => {
            cli::stat(&config.registry()?, &file).await?;
        }

        Commands::Download { file, output } => {
            cli::download(&config.registry()?, &file, output).await?;
        }

        Commands::Delete { file } => {
            cli::delete(&config.registry()?, &file).await?;
        }
    }

    Ok(())
}
