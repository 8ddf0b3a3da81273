//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tessera - inspect stored content and build signed download URLs
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Inspect stored content and build signed download URLs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the layered lookup)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Content addressed by backend name and identifier
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Registered backend name
    pub backend: String,

    /// Content identifier
    pub id: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a signed download URL
    Url {
        #[command(flatten)]
        file: FileArgs,

        /// Filename shown in the URL (defaults to the id)
        #[arg(long)]
        filename: Option<String>,

        /// Extension appended to the filename
        #[arg(long)]
        format: Option<String>,

        /// Host overriding the configured one
        #[arg(long)]
        host: Option<String>,

        /// Mount prefix overriding the configured one
        #[arg(long)]
        prefix: Option<String>,

        /// Extra path segment before the id (repeatable)
        #[arg(long = "segment")]
        segments: Vec<String>,
    },

    /// Write content to stdout
    Cat {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Show existence, size and media type
    Stat {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Materialize content into a local file and print its path
    Download {
        #[command(flatten)]
        file: FileArgs,

        /// Destination (defaults to a kept temporary file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Permanently delete content
    Delete {
        #[command(flatten)]
        file: FileArgs,
    },
}
