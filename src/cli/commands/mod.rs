//! CLI commands for student-sql.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Ask a question in plain English and run the generated SQL.
pub mod ask;

/// Generate shell completion scripts.
pub mod completions;

/// Show effective configuration.
pub mod config;

/// Interactive data-entry shell backed by a session buffer.
pub mod entry;

/// Create the database and STUDENT table.
pub mod init;

/// List committed student records.
pub mod records;
