//! Completions command - generate shell completion scripts.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    student-sql completions bash > ~/.local/share/bash-completion/completions/student-sql\n    \
    student-sql completions zsh > ~/.zfunc/_student-sql\n    \
    student-sql completions fish > ~/.config/fish/completions/student-sql.fish")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes completions for `cmd` to stdout.
///
/// Called from main.rs, which owns the top-level `Cli` definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, "student-sql", &mut io::stdout());
}
