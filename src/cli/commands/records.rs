//! Records command - list committed student records.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::format::{markdown_table, text_table};
use crate::cli::{open_database, OutputFormat};
use crate::storage::StudentRecord;

/// Arguments for the records command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    student-sql records                  List stored students\n    \
    student-sql records --limit 5        Show only the first five\n    \
    student-sql records --format json    Output as JSON")]
pub struct Args {
    /// Maximum number of records to display
    #[arg(short, long, default_value = "100", value_name = "N")]
    pub limit: usize,

    /// Output format: text (default), json, markdown
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the records command.
pub fn run(args: Args, db_path: Option<&Path>) -> Result<()> {
    let db = open_database(db_path)?;
    let records = db.list_students(args.limit)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No students stored.".dimmed());
        println!();
        println!("Run 'student-sql entry' to add some.");
        return Ok(());
    }

    let (columns, rows) = record_table(&records);
    match args.format {
        OutputFormat::Markdown => println!("{}", markdown_table(&columns, &rows)),
        _ => println!("{}", text_table(&columns, &rows)),
    }

    let total = db.student_count()?;
    if (records.len() as i64) < total {
        println!();
        println!(
            "{}",
            format!("Showing {} of {} students.", records.len(), total).dimmed()
        );
    }
    Ok(())
}

/// Column headers and display cells for a list of records.
pub(crate) fn record_table(records: &[StudentRecord]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns = ["STUDENT_ID", "NAME", "CLASS", "SECTION", "MARKS"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.student_id.clone(),
                r.name.clone(),
                r.class.clone(),
                r.section.clone(),
                r.marks.to_string(),
            ]
        })
        .collect();
    (columns, rows)
}
