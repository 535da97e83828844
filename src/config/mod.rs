//! Configuration management
//!
//! Settings come from `~/.student-sql/config.yaml` when it exists, with
//! environment variables (including a `.env` file in the working
//! directory) taking precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Database file used when nothing else is configured.
pub const DEFAULT_DB_FILE: &str = "student.db";

/// Environment variable overriding the database path.
pub const DB_ENV: &str = "STUDENT_SQL_DB";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file
    pub db_path: Option<PathBuf>,

    /// Model provider name (gemini, anthropic, openai, openrouter)
    pub provider: Option<String>,

    /// Model identifier override
    pub model: Option<String>,

    /// Provider API key
    pub api_key: Option<String>,
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing.
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(_) => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config at {}", path.display()))
    }

    /// Parse a config document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_saphyr::from_str(text)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
            .join(".student-sql");

        Ok(config_dir.join("config.yaml"))
    }

    /// Effective database path: `STUDENT_SQL_DB` > config file > `./student.db`.
    pub fn db_path(&self) -> PathBuf {
        env::var(DB_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
    }
}

/// Load `.env` from the working directory into the process environment.
///
/// Existing variables are not overwritten. A missing file is fine; a
/// malformed one is an error.
pub fn load_dotenv() -> Result<()> {
    let cwd = env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        tracing::debug!(path = %env_path.display(), "loaded dotenv file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_full() {
        let config = Config::from_yaml(
            "db_path: /tmp/school.db\nprovider: openai\nmodel: gpt-4o-mini\napi_key: sk-test\n",
        )
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/school.db")));
        assert_eq!(config.provider.as_deref(), Some("openai"));
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_from_yaml_partial_uses_defaults() {
        let config = Config::from_yaml("provider: gemini\n").unwrap();
        assert_eq!(config.provider.as_deref(), Some("gemini"));
        assert!(config.db_path.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_from_yaml_empty_document() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_config_path_under_home() {
        if let Ok(path) = Config::config_path() {
            assert!(path.ends_with(".student-sql/config.yaml"));
        }
    }
}
