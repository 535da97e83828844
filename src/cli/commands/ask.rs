//! Ask command - answer a plain-English question with generated SQL.
//!
//! The question is sent to the configured model provider along with the
//! built-in instruction template. The reply is executed against the
//! database exactly as returned, without any validation, and the raw rows
//! are printed. Failures are reported and the command still exits
//! normally with an empty result.
//!
//! In JSON mode stdout carries only JSON; failure messages go to stderr.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

use crate::cli::format::{markdown_table, text_table};
use crate::cli::{open_database, OutputFormat};
use crate::config::Config;
use crate::query::{self, configured_provider, prompt, Answer, GenerationError, SqlProvider};
use crate::storage::{Database, QueryRows};

/// Arguments for the ask command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    student-sql ask \"How many entries of records are present?\"\n    \
    student-sql ask \"Who scored above 90?\" --format json\n    \
    student-sql ask \"List section B\" --show-sql\n\n\
WARNING:\n    \
    Generated SQL runs unchecked. A reply that deletes or alters data\n    \
    will be executed just like a query.")]
pub struct Args {
    /// The question to ask
    #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Output format: text (default), json, markdown
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the generated SQL (text, markdown) or include it (json)
    #[arg(long)]
    pub show_sql: bool,
}

/// How an answer is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AskOptions {
    pub format: OutputFormat,
    pub show_sql: bool,
}

/// Executes the ask command.
pub fn run(args: Args, db_path: Option<&Path>) -> Result<()> {
    let question = args.question.join(" ");
    let options = AskOptions {
        format: args.format,
        show_sql: args.show_sql,
    };
    let db = open_database(db_path)?;
    let config = Config::load()?;

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    match configured_provider(&config) {
        Ok(provider) => run_with(
            provider.as_ref(),
            &db,
            &question,
            options,
            &mut out,
            &mut err,
        ),
        Err(e) => report_generation_failure(&e, options.format, &mut out, &mut err),
    }
}

/// Generates SQL with `provider`, runs it against `db` and writes the result.
///
/// Generation and query failures are written out and do not produce an
/// `Err`; only I/O and serialization errors do.
pub fn run_with(
    provider: &dyn SqlProvider,
    db: &Database,
    question: &str,
    options: AskOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let sql = match query::translate(provider, question, prompt::instruction_template()) {
        Ok(sql) => sql,
        Err(e) => {
            tracing::warn!(error = %e, "generation failed");
            return report_generation_failure(&e, options.format, out, err);
        }
    };

    let rows = match query::execute(&sql, db) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(sql = %e.sql, error = %e.message, "generated statement failed");
            let sink = diagnostics(options.format, out, err);
            writeln!(sink, "{} {}", "Generated SQL Query:".bold(), sql)?;
            writeln!(sink, "{} {}", "SQLite error:".red(), e.message)?;
            // Already shown above.
            let options = AskOptions {
                show_sql: options.show_sql && options.format == OutputFormat::Json,
                ..options
            };
            return print_answer(
                &Answer {
                    question: question.to_string(),
                    sql,
                    rows: QueryRows::default(),
                },
                options,
                out,
            );
        }
    };

    print_answer(
        &Answer {
            question: question.to_string(),
            sql,
            rows,
        },
        options,
        out,
    )
}

/// Failure text lands on stdout for humans and on stderr beside JSON.
fn diagnostics<'a>(
    format: OutputFormat,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
) -> &'a mut dyn Write {
    if format == OutputFormat::Json {
        err
    } else {
        out
    }
}

fn report_generation_failure(
    e: &GenerationError,
    format: OutputFormat,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let sink = diagnostics(format, out, err);
    writeln!(sink, "{} {}", "Error in generating response:".red(), e)?;
    writeln!(sink, "{}", "Failed to generate a valid SQL query.".red())?;
    Ok(())
}

fn print_answer(answer: &Answer, options: AskOptions, out: &mut dyn Write) -> Result<()> {
    if options.format == OutputFormat::Json {
        let mut value = serde_json::to_value(answer)?;
        if !options.show_sql {
            if let Some(object) = value.as_object_mut() {
                object.remove("sql");
            }
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    if options.show_sql {
        match options.format {
            OutputFormat::Markdown => writeln!(out, "```sql\n{}\n```\n", answer.sql)?,
            _ => writeln!(out, "{} {}\n", "Generated SQL Query:".bold(), answer.sql)?,
        }
    }

    if answer.rows.is_empty() {
        writeln!(out, "{}", "No data found or an error occurred.".yellow())?;
        return Ok(());
    }

    let cells: Vec<Vec<String>> = answer
        .rows
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    match options.format {
        OutputFormat::Markdown => {
            writeln!(out, "{}", markdown_table(&answer.rows.columns, &cells))?;
        }
        _ => {
            writeln!(out, "{}", "Query Results".bold())?;
            writeln!(out, "{}", text_table(&answer.rows.columns, &cells))?;
        }
    }
    Ok(())
}
