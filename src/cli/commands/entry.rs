//! Entry command - interactive student data entry.
//!
//! Opens a line-oriented shell that collects records into a session
//! buffer. Nothing reaches the database until `submit`; quitting first
//! throws the buffered records away. Every error is printed and the shell
//! keeps going.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::cli::commands::records::record_table;
use crate::cli::format::text_table;
use crate::cli::open_database;
use crate::session::{EntryAction, EntryError, EntryOutcome, SessionBuffer};
use crate::storage::{Database, StudentRecord};

const HELP: &str = "\
Commands:
  add <id> <name> <class> <section> <marks>            Buffer a new record
  update <n> <id> <name> <class> <section> <marks>     Replace record n
  delete <n>                                           Remove record n
  list                                                 Show buffered records
  submit                                               Save all records to the database
  clear                                                Discard all buffered records
  help                                                 Show this help
  quit                                                 Leave (unsubmitted records are lost)

Wrap values containing spaces in double quotes, e.g. add S7 \"Ann Lee\" \"Data Science\" A 91";

/// Arguments for the entry command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    student-sql entry                    Start an interactive entry session\n    \
    student-sql entry < batch.txt        Replay shell commands from a file")]
pub struct Args {}

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Action(EntryAction),
    Help,
    Quit,
    Blank,
}

/// Executes the entry command on stdin/stdout.
pub fn run(_args: Args, db_path: Option<&Path>) -> Result<()> {
    let db = open_database(db_path)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(&db, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Drives a session over arbitrary input and output.
///
/// Returns the buffer as it stood when input ended, so callers can see
/// what was left unsubmitted.
pub fn run_shell<R: BufRead, W: Write>(
    db: &Database,
    input: R,
    mut out: W,
) -> Result<SessionBuffer> {
    let mut buffer = SessionBuffer::new();

    writeln!(out, "{}", "Student Data Entry".bold())?;
    writeln!(out, "{}", "Type 'help' for commands.".dimmed())?;

    let mut lines = input.lines();
    loop {
        write!(out, "{} ", format!("entry[{}]>", buffer.len()).cyan())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{} {}", "✗".red(), msg)?;
                continue;
            }
        };

        match command {
            ShellCommand::Blank => {}
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => break,
            ShellCommand::Action(action) => match buffer.apply(db, action) {
                Ok(outcome) => report(&mut out, &outcome)?,
                Err(EntryError::IndexOutOfRange { index, len }) => writeln!(
                    out,
                    "{} No record #{} (this session has {})",
                    "✗".red(),
                    index + 1,
                    len
                )?,
                Err(e) => {
                    tracing::debug!(error = %e, "entry action rejected");
                    writeln!(out, "{} {}", "✗".red(), e)?;
                }
            },
        }
    }

    if !buffer.is_empty() {
        writeln!(
            out,
            "{}",
            format!(
                "{} unsubmitted record(s) discarded.",
                buffer.len()
            )
            .yellow()
        )?;
    }
    Ok(buffer)
}

fn report<W: Write>(out: &mut W, outcome: &EntryOutcome) -> io::Result<()> {
    match outcome {
        EntryOutcome::Added(record) => writeln!(
            out,
            "{} Record {} added successfully!",
            "✓".green(),
            record.student_id.cyan()
        ),
        EntryOutcome::Edited { index, record } => writeln!(
            out,
            "{} Record {} ({}) updated successfully!",
            "✓".green(),
            index + 1,
            record.student_id.cyan()
        ),
        EntryOutcome::Deleted(record) => writeln!(
            out,
            "{} Record {} deleted.",
            "✓".green(),
            record.student_id.cyan()
        ),
        EntryOutcome::Flushed(0) => {
            writeln!(out, "{}", "Nothing to submit.".dimmed())
        }
        EntryOutcome::Flushed(count) => writeln!(
            out,
            "{} All {} record(s) added to the database successfully!",
            "✓".green(),
            count
        ),
        EntryOutcome::Cleared(count) => {
            writeln!(out, "{} Discarded {} record(s).", "✓".green(), count)
        }
        EntryOutcome::Listed(records) => list(out, records),
    }
}

fn list<W: Write>(out: &mut W, records: &[StudentRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{}", "No records in this session.".dimmed());
    }

    let (mut columns, rows) = record_table(records);
    columns.insert(0, "#".to_string());
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, mut row)| {
            row.insert(0, (idx + 1).to_string());
            row
        })
        .collect();

    writeln!(out, "{}", "Current Session Records".bold())?;
    writeln!(out, "{}", text_table(&columns, &rows))
}

/// Parses one line of shell input.
///
/// Positions are 1-based on input and converted to buffer indices here.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let tokens = tokenize(line)?;
    let Some((verb, rest)) = tokens.split_first() else {
        return Ok(ShellCommand::Blank);
    };

    match verb.to_lowercase().as_str() {
        "add" => {
            expect_args("add <id> <name> <class> <section> <marks>", rest, 5)?;
            Ok(ShellCommand::Action(EntryAction::Add(parse_record(rest)?)))
        }
        "update" | "edit" => {
            expect_args(
                "update <n> <id> <name> <class> <section> <marks>",
                rest,
                6,
            )?;
            let index = parse_position(&rest[0])?;
            let record = parse_record(&rest[1..])?;
            Ok(ShellCommand::Action(EntryAction::Edit { index, record }))
        }
        "delete" | "rm" => {
            expect_args("delete <n>", rest, 1)?;
            Ok(ShellCommand::Action(EntryAction::Delete(parse_position(
                &rest[0],
            )?)))
        }
        "list" | "ls" => Ok(ShellCommand::Action(EntryAction::List)),
        "submit" => Ok(ShellCommand::Action(EntryAction::Flush)),
        "clear" => Ok(ShellCommand::Action(EntryAction::Clear)),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command '{other}'. Type 'help' for commands.")),
    }
}

fn expect_args(usage: &str, args: &[String], count: usize) -> Result<(), String> {
    if args.len() != count {
        return Err(format!("Usage: {usage}"));
    }
    Ok(())
}

fn parse_record(fields: &[String]) -> Result<StudentRecord, String> {
    let marks = fields[4]
        .parse::<i64>()
        .map_err(|_| format!("Marks must be a whole number, got '{}'", fields[4]))?;
    Ok(StudentRecord::new(
        fields[0].as_str(),
        fields[1].as_str(),
        fields[2].as_str(),
        fields[3].as_str(),
        marks,
    ))
}

fn parse_position(token: &str) -> Result<usize, String> {
    match token.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Record numbers start at 1, got '{token}'")),
    }
}

/// Splits on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(db: &Database, script: &str) -> (SessionBuffer, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let buffer = run_shell(db, Cursor::new(script.to_string()), &mut out).unwrap();
        (buffer, String::from_utf8(out).unwrap())
    }

    // ==================== tokenize / parse ====================

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"add S1 "Ann Lee" "Data Science" A 90"#).unwrap(),
            vec!["add", "S1", "Ann Lee", "Data Science", "A", "90"]
        );
    }

    #[test]
    fn test_tokenize_empty_quotes_is_token() {
        assert_eq!(tokenize(r#"add "" x"#).unwrap(), vec!["add", "", "x"]);
    }

    #[test]
    fn test_tokenize_unterminated() {
        assert!(tokenize(r#"add "S1"#).is_err());
    }

    #[test]
    fn test_parse_add() {
        let command = parse_line("add S1 Alice 10 A 85").unwrap();
        assert_eq!(
            command,
            ShellCommand::Action(EntryAction::Add(StudentRecord::new(
                "S1", "Alice", "10", "A", 85
            )))
        );
    }

    #[test]
    fn test_parse_update_converts_position() {
        let command = parse_line("update 2 S1 Alice 10 A 85").unwrap();
        match command {
            ShellCommand::Action(EntryAction::Edit { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected Edit, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_line("add S1 Alice 10 A").is_err());
        assert!(parse_line("add S1 Alice 10 A eighty").is_err());
        assert!(parse_line("delete 0").is_err());
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn test_parse_misc_commands() {
        assert_eq!(parse_line("   ").unwrap(), ShellCommand::Blank);
        assert_eq!(parse_line("HELP").unwrap(), ShellCommand::Help);
        assert_eq!(parse_line("exit").unwrap(), ShellCommand::Quit);
        assert_eq!(
            parse_line("submit").unwrap(),
            ShellCommand::Action(EntryAction::Flush)
        );
    }

    // ==================== shell ====================

    #[test]
    fn test_shell_add_and_submit() {
        let db = Database::open_in_memory().unwrap();
        let (buffer, output) = run_script(
            &db,
            "add S1 Alice 10 A 85\nadd S2 Bob 10 B 70\nlist\nsubmit\nquit\n",
        );

        assert!(buffer.is_empty());
        assert_eq!(db.student_count().unwrap(), 2);
        assert!(output.contains("Record S1 added successfully!"));
        assert!(output.contains("Current Session Records"));
        assert!(output.contains("All 2 record(s) added to the database successfully!"));
        assert!(!output.contains("discarded"));
    }

    #[test]
    fn test_shell_reports_duplicate_and_continues() {
        let db = Database::open_in_memory().unwrap();
        let (buffer, output) = run_script(
            &db,
            "add S1 Alice 10 A 85\nadd S1 Bob 10 B 70\nadd S2 Cara 10 A 60\n",
        );

        assert!(output.contains("Student ID S1 already exists"));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.records()[0].name, "Alice");
    }

    #[test]
    fn test_shell_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let (buffer, output) = run_script(
            &db,
            "add S1 Alice 10 A 85\nadd S2 Bob 10 B 70\nupdate 1 S1 \"Alice Smith\" 11 C 88\ndelete 2\ndelete 5\n",
        );

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.records()[0].name, "Alice Smith");
        assert!(output.contains("No record #5 (this session has 1)"));
    }

    #[test]
    fn test_shell_eof_discards_unsubmitted() {
        let db = Database::open_in_memory().unwrap();
        let (buffer, output) = run_script(&db, "add S1 Alice 10 A 85\n");

        assert_eq!(buffer.len(), 1);
        assert_eq!(db.student_count().unwrap(), 0);
        assert!(output.contains("1 unsubmitted record(s) discarded."));
    }

    #[test]
    fn test_shell_validation_message() {
        let db = Database::open_in_memory().unwrap();
        let (buffer, output) = run_script(&db, "add S1 Alice 10 A 101\nquit\n");

        assert!(buffer.is_empty());
        assert!(output.contains("marks must be between 0 and 100"));
    }
}
