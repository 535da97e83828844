//! Natural-language questions answered with generated SQL.
//!
//! A question is sent to a hosted model together with the fixed
//! [`prompt::instruction_template`]. Whatever text comes back is executed
//! verbatim against the student database through
//! [`Database::execute_unchecked`].
//!
//! # Hazard
//!
//! The generated statement is never validated. A reply such as
//! `DROP TABLE STUDENT` will be executed like any `SELECT`. Keep that in mind
//! before pointing this at data you care about.

pub mod prompt;
pub mod provider;

use std::env;

use crate::config::Config;
use crate::storage::{Database, QueryRows};

pub use provider::{create_provider, ProviderKind, SqlProvider};

/// Environment variable selecting the provider.
pub const PROVIDER_ENV: &str = "STUDENT_SQL_PROVIDER";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "STUDENT_SQL_API_KEY";

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "STUDENT_SQL_MODEL";

/// Gemini key variable, read when the provider is Gemini and no
/// `STUDENT_SQL_API_KEY` is set.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEYS";

/// Resolved provider configuration from config file and environment variables.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Optional model override (uses provider default if None).
    pub model: Option<String>,
}

/// SQL text produced for a question and the rows it returned.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Answer {
    pub question: String,
    pub sql: String,
    #[serde(flatten)]
    pub rows: QueryRows,
}

/// Errors while obtaining SQL text from a model.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No provider API key is available.
    #[error(
        "Model provider not configured. Set STUDENT_SQL_API_KEY (or GOOGLE_API_KEYS for Gemini)."
    )]
    NotConfigured,

    /// The configured provider name is not recognised.
    #[error("{0}")]
    UnknownProvider(String),

    /// Network or connection error when calling the provider API.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The provider API returned a non-success HTTP status code.
    #[error("HTTP error ({status}): {body}")]
    HttpError { status: u16, body: String },

    /// Failed to parse the provider API response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The model replied with nothing usable.
    #[error("Empty response from the model")]
    EmptyResponse,
}

/// The generated statement could not be executed.
#[derive(Debug, thiserror::Error)]
#[error("Query failed: {message}")]
pub struct QueryError {
    pub sql: String,
    pub message: String,
}

/// Either half of [`ask`] failing.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Resolves provider configuration from the config file and environment.
///
/// Precedence, highest first:
/// - provider: `STUDENT_SQL_PROVIDER`, config `provider`, then Gemini
/// - api key: `STUDENT_SQL_API_KEY`, `GOOGLE_API_KEYS` (Gemini only), config `api_key`
/// - model: `STUDENT_SQL_MODEL`, config `model`, then the provider default
pub fn resolve_config(config: &Config) -> Result<ProviderConfig, GenerationError> {
    resolve_config_with(config, |key| env::var(key).ok())
}

fn resolve_config_with(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, GenerationError> {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let kind = match non_empty(PROVIDER_ENV).or_else(|| config.provider.clone()) {
        Some(name) => name
            .parse::<ProviderKind>()
            .map_err(GenerationError::UnknownProvider)?,
        None => ProviderKind::default(),
    };

    let api_key = non_empty(API_KEY_ENV)
        .or_else(|| {
            if kind == ProviderKind::Gemini {
                non_empty(GOOGLE_API_KEY_ENV)
            } else {
                None
            }
        })
        .or_else(|| config.api_key.clone())
        .filter(|key| !key.trim().is_empty())
        .ok_or(GenerationError::NotConfigured)?;

    let model = non_empty(MODEL_ENV).or_else(|| config.model.clone());

    Ok(ProviderConfig {
        kind,
        api_key,
        model,
    })
}

/// Builds the provider described by the current configuration.
pub fn configured_provider(config: &Config) -> Result<Box<dyn SqlProvider>, GenerationError> {
    let resolved = resolve_config(config)?;
    create_provider(resolved.kind, resolved.api_key, resolved.model)
}

/// Asks the model for SQL answering `question`.
///
/// Only surrounding whitespace is trimmed from the reply. An empty or
/// whitespace-only reply is an error.
pub fn translate(
    provider: &dyn SqlProvider,
    question: &str,
    instructions: &str,
) -> Result<String, GenerationError> {
    let reply = provider.generate(instructions, question)?;
    let sql = reply.trim();
    if sql.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    tracing::debug!(sql, "generated statement");
    Ok(sql.to_string())
}

/// Executes `sql` exactly as given. See the module-level hazard note.
pub fn execute(sql: &str, db: &Database) -> Result<QueryRows, QueryError> {
    db.execute_unchecked(sql).map_err(|e| QueryError {
        sql: sql.to_string(),
        message: format!("{e:#}"),
    })
}

/// Translates `question` with the built-in template and executes the result.
pub fn ask(provider: &dyn SqlProvider, db: &Database, question: &str) -> Result<Answer, AskError> {
    let sql = translate(provider, question, prompt::instruction_template())?;
    let rows = execute(&sql, db)?;
    Ok(Answer {
        question: question.to_string(),
        sql,
        rows,
    })
}
