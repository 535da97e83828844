//! Command-line interface for student-sql.
//!
//! Provides the data-entry shell, the natural-language query command,
//! and a few helpers for inspecting the database and configuration.

/// Individual CLI command implementations.
pub mod commands;

/// Output format selection and table rendering.
pub mod format;

pub use format::OutputFormat;

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::storage::Database;

/// Opens the database at `path`, or the configured one when `path` is None.
pub fn open_database(path: Option<&Path>) -> Result<Database> {
    match path {
        Some(path) => Database::open(path),
        None => Database::open_default(),
    }
}

/// Resolves the database path the same way [`open_database`] does.
pub fn database_path(path: Option<&Path>) -> Result<std::path::PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::load()?.db_path()),
    }
}
