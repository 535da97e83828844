use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use student_sql::cli::commands;
use student_sql::config;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "student-sql")]
#[command(version)]
#[command(about = "Buffered student data entry and plain-English SQL queries")]
#[command(long_about = "Collects student records in a session buffer and commits them to a\n\
    local SQLite database in one go. Questions asked in plain English are\n\
    turned into SQL by a hosted model and run against the same database.")]
#[command(after_help = "EXAMPLES:\n    \
    student-sql init                         Create ./student.db\n    \
    student-sql entry                        Enter records interactively\n    \
    student-sql records                      List stored students\n    \
    student-sql ask \"Who scored above 90?\"   Query in plain English\n    \
    student-sql config                       Show effective configuration\n\n\
    For more information about a command, run 'student-sql <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file to use (defaults to STUDENT_SQL_DB, the config file, or ./student.db)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create the database and STUDENT table if missing
    Init(commands::init::Args),

    /// Enter student records interactively and submit them together
    #[command(long_about = "Opens a data-entry shell. Records are held in this session only\n\
        until 'submit' writes them all to the database in one transaction.\n\
        Student IDs are checked against both the session and the database.")]
    Entry(commands::entry::Args),

    /// Ask a question in plain English and run the generated SQL
    #[command(long_about = "Sends the question and a fixed instruction template to the\n\
        configured model provider, then executes the returned SQL exactly\n\
        as given and prints the raw rows. The SQL is NOT validated.")]
    Ask(commands::ask::Args),

    /// List students stored in the database
    Records(commands::records::Args),

    /// View configuration settings
    Config(commands::config::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "student_sql=debug"
    } else {
        "student_sql=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    config::load_dotenv()?;

    let db = cli.db.as_deref();
    match cli.command {
        Commands::Init(args) => commands::init::run(args, db),
        Commands::Entry(args) => commands::entry::run(args, db),
        Commands::Ask(args) => commands::ask::run(args, db),
        Commands::Records(args) => commands::records::run(args, db),
        Commands::Config(args) => commands::config::run(args, db),
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            commands::completions::generate_completions(&mut cmd, args.shell);
            Ok(())
        }
    }
}
