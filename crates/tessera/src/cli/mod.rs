//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the tessera binary.

mod commands;
mod files;

pub use commands::{Cli, Commands, FileArgs};
pub use files::{cat, delete, download, stat, url};
