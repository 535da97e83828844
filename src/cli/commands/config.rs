//! Config command - show effective configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::Path;

use crate::cli::database_path;
use crate::config::Config;
use crate::query::{provider::default_model, resolve_config, GenerationError};

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
}

pub fn run(args: Args, db_path: Option<&Path>) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(db_path),
        Some(ConfigCommand::Path) => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
    }
}

fn show_config(db_path: Option<&Path>) -> Result<()> {
    let config = Config::load()?;

    println!("{}", "student-sql Configuration".bold());
    println!();
    println!(
        "  {}  {}",
        "Config file:".dimmed(),
        Config::config_path()?.display()
    );
    println!(
        "  {}     {}",
        "Database:".dimmed(),
        database_path(db_path)?.display()
    );

    println!();
    println!("{}", "Model provider:".bold());
    match resolve_config(&config) {
        Ok(resolved) => {
            let model = resolved
                .model
                .unwrap_or_else(|| default_model(resolved.kind).to_string());
            println!("  {}  {}", "Provider:".dimmed(), resolved.kind);
            println!("  {}     {}", "Model:".dimmed(), model);
            println!("  {}   {}", "API key:".dimmed(), mask_key(&resolved.api_key));
        }
        Err(GenerationError::NotConfigured) => {
            println!("  {} no API key found", "○".dimmed());
            println!(
                "  {}",
                "Set STUDENT_SQL_API_KEY or GOOGLE_API_KEYS, in the environment or a .env file."
                    .yellow()
            );
        }
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    Ok(())
}

/// Shows only the last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key_keeps_last_four() {
        assert_eq!(mask_key("sk-abcdef1234"), "*********1234");
    }

    #[test]
    fn test_mask_key_short() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key(""), "");
    }
}
