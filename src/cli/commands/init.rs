//! Init command - create the database file and STUDENT table.
//!
//! Safe to run repeatedly: an existing table and its rows are left alone.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::{database_path, open_database};

/// Arguments for the init command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    student-sql init                     Create ./student.db\n    \
    student-sql --db school.db init      Create a database at a custom path")]
pub struct Args {}

/// Executes the init command.
pub fn run(_args: Args, db_path: Option<&Path>) -> Result<()> {
    let path = database_path(db_path)?;
    let db = open_database(Some(path.as_path()))?;
    let count = db.student_count()?;

    println!(
        "{} {}",
        "Database initialized:".green(),
        path.display().to_string().cyan()
    );
    println!("  {}  {}", "Students stored:".dimmed(), count);

    Ok(())
}
