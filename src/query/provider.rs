//! Hosted model integrations that turn a question into SQL text.
//!
//! Supports Gemini, Anthropic, OpenAI, and OpenRouter. Each provider
//! implements the [`SqlProvider`] trait, and the [`create_provider`]
//! factory builds the appropriate one from configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::GenerationError;

/// Timeout for establishing a connection (30 seconds).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the entire request including response (120 seconds).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound on generated tokens; a single statement needs far fewer.
const MAX_TOKENS: u32 = 1024;

// ==================== Types ====================

/// Supported model provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Google Gemini API.
    #[default]
    Gemini,
    /// Anthropic Claude API.
    Anthropic,
    /// OpenAI Chat Completions API.
    OpenAI,
    /// OpenRouter unified API.
    OpenRouter,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => Err(format!(
                "Unknown provider: '{other}'. Expected one of: gemini, anthropic, openai, openrouter"
            )),
        }
    }
}

// ==================== Trait ====================

/// A text-generation service that answers a question with SQL.
///
/// Implementors send the instruction template and the question to a model
/// and return its raw reply. The reply is not inspected here.
pub trait SqlProvider {
    /// Generate a reply for `question` under `instructions`.
    fn generate(&self, instructions: &str, question: &str) -> Result<String, GenerationError>;
}

// ==================== Gemini ====================

/// Google Gemini `generateContent` provider.
pub(crate) struct GeminiProvider {
    client: Client,
    api_key: String,
    /// Model identifier (e.g., "gemini-2.0-flash").
    model: String,
}

impl GeminiProvider {
    pub(crate) fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// Builds the request body. The instructions and the question travel as
    /// two parts of a single user turn.
    fn build_request_body(&self, instructions: &str, question: &str) -> Value {
        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        { "text": instructions },
                        { "text": question },
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": MAX_TOKENS,
            }
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

impl SqlProvider for GeminiProvider {
    fn generate(&self, instructions: &str, question: &str) -> Result<String, GenerationError> {
        let body = self.build_request_body(instructions, question);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let json = read_json(response)?;
        parse_gemini_response(&json)
    }
}

// ==================== Anthropic ====================

/// Anthropic Claude Messages API provider.
pub(crate) struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub(crate) fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn build_request_body(&self, instructions: &str, question: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": instructions,
            "messages": [
                {
                    "role": "user",
                    "content": question,
                }
            ]
        })
    }
}

impl SqlProvider for AnthropicProvider {
    fn generate(&self, instructions: &str, question: &str) -> Result<String, GenerationError> {
        let body = self.build_request_body(instructions, question);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let json = read_json(response)?;
        parse_anthropic_response(&json)
    }
}

// ==================== OpenAI-compatible ====================

/// OpenAI Chat Completions provider. Also serves OpenRouter, which speaks
/// the same format at a different base URL.
pub(crate) struct ChatCompletionsProvider {
    client: Client,
    api_key: String,
    model: String,
    url: &'static str,
}

impl ChatCompletionsProvider {
    pub(crate) fn openai(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            url: "https://api.openai.com/v1/chat/completions",
        }
    }

    pub(crate) fn openrouter(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            url: "https://openrouter.ai/api/v1/chat/completions",
        }
    }

    fn build_request_body(&self, instructions: &str, question: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "system",
                    "content": instructions,
                },
                {
                    "role": "user",
                    "content": question,
                }
            ]
        })
    }
}

impl SqlProvider for ChatCompletionsProvider {
    fn generate(&self, instructions: &str, question: &str) -> Result<String, GenerationError> {
        let body = self.build_request_body(instructions, question);

        let response = self
            .client
            .post(self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let json = read_json(response)?;
        parse_chat_completions_response(&json)
    }
}

// ==================== Shared Helpers ====================

/// Checks the status and decodes the JSON body.
fn read_json(response: reqwest::blocking::Response) -> Result<Value, GenerationError> {
    let status = response.status();
    if !status.is_success() {
        let body_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(GenerationError::HttpError {
            status: status.as_u16(),
            body: body_text,
        });
    }

    response
        .json()
        .map_err(|e| GenerationError::ParseError(e.to_string()))
}

/// Extracts `candidates[0].content.parts[*].text`, joining multiple parts.
fn parse_gemini_response(json: &Value) -> Result<String, GenerationError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            GenerationError::ParseError(
                "Missing candidates[0].content.parts in Gemini response".to_string(),
            )
        })?;

    Ok(parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join(""))
}

/// Extracts `content[0].text` from an Anthropic Messages response.
fn parse_anthropic_response(json: &Value) -> Result<String, GenerationError> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::ParseError("Missing content[0].text in Anthropic response".to_string())
        })
}

/// Extracts `choices[0].message.content` from a Chat Completions response.
fn parse_chat_completions_response(json: &Value) -> Result<String, GenerationError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::ParseError("Missing choices[0].message.content in response".to_string())
        })
}

// ==================== Factory ====================

/// Returns the default model for the given provider kind.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini-2.0-flash",
        ProviderKind::Anthropic => "claude-haiku-4-5",
        ProviderKind::OpenAI => "gpt-4o-mini",
        ProviderKind::OpenRouter => "meta-llama/llama-3.1-8b-instruct:free",
    }
}

/// Creates a provider for the given kind.
///
/// If `model` is `None`, uses the default model for the provider kind.
pub fn create_provider(
    kind: ProviderKind,
    api_key: String,
    model: Option<String>,
) -> Result<Box<dyn SqlProvider>, GenerationError> {
    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| GenerationError::RequestFailed(format!("Failed to build HTTP client: {e}")))?;

    let model = model.unwrap_or_else(|| default_model(kind).to_string());
    tracing::debug!(provider = %kind, model = %model, "creating provider");

    Ok(match kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(client, api_key, model)),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(client, api_key, model)),
        ProviderKind::OpenAI => Box::new(ChatCompletionsProvider::openai(client, api_key, model)),
        ProviderKind::OpenRouter => {
            Box::new(ChatCompletionsProvider::openrouter(client, api_key, model))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_client() -> Client {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client")
    }

    // ==================== ProviderKind ====================

    #[test]
    fn test_provider_kind_default_is_gemini() {
        assert_eq!(ProviderKind::default(), ProviderKind::Gemini);
    }

    #[test]
    fn test_provider_kind_display_round_trips() {
        for kind in [
            ProviderKind::Gemini,
            ProviderKind::Anthropic,
            ProviderKind::OpenAI,
            ProviderKind::OpenRouter,
        ] {
            assert_eq!(ProviderKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_provider_kind_from_str_case_insensitive() {
        assert_eq!(
            ProviderKind::from_str("GEMINI").unwrap(),
            ProviderKind::Gemini
        );
        assert_eq!(
            ProviderKind::from_str("google").unwrap(),
            ProviderKind::Gemini
        );
        assert_eq!(
            ProviderKind::from_str("OpenAI").unwrap(),
            ProviderKind::OpenAI
        );
    }

    #[test]
    fn test_provider_kind_from_str_unknown() {
        let err = ProviderKind::from_str("llama").unwrap_err();
        assert!(err.contains("Unknown provider"));
        assert!(err.contains("llama"));
    }

    #[test]
    fn test_default_models() {
        assert_eq!(default_model(ProviderKind::Gemini), "gemini-2.0-flash");
        assert_eq!(default_model(ProviderKind::OpenAI), "gpt-4o-mini");
    }

    #[test]
    fn test_create_provider_does_not_fail() {
        for kind in [
            ProviderKind::Gemini,
            ProviderKind::Anthropic,
            ProviderKind::OpenAI,
            ProviderKind::OpenRouter,
        ] {
            assert!(create_provider(kind, "test-key".to_string(), None).is_ok());
        }
    }

    // ==================== Request bodies ====================

    #[test]
    fn test_gemini_request_body() {
        let provider = GeminiProvider::new(
            build_client(),
            "test-key".to_string(),
            "gemini-2.0-flash".to_string(),
        );

        let body = provider.build_request_body("Write SQL.", "How many students?");
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "Write SQL.");
        assert_eq!(parts[1]["text"], "How many students?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(provider.endpoint().ends_with("/models/gemini-2.0-flash:generateContent"));
    }

    #[test]
    fn test_anthropic_request_body() {
        let provider = AnthropicProvider::new(
            build_client(),
            "test-key".to_string(),
            "claude-haiku-4-5".to_string(),
        );

        let body = provider.build_request_body("Write SQL.", "How many students?");

        assert_eq!(body["model"], "claude-haiku-4-5");
        assert_eq!(body["system"], "Write SQL.");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "How many students?");
    }

    #[test]
    fn test_chat_completions_request_body() {
        let provider = ChatCompletionsProvider::openai(
            build_client(),
            "test-key".to_string(),
            "gpt-4o-mini".to_string(),
        );

        let body = provider.build_request_body("Write SQL.", "How many students?");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Write SQL.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "How many students?");
    }

    #[test]
    fn test_chat_completions_endpoints() {
        let openrouter = ChatCompletionsProvider::openrouter(
            build_client(),
            "test-key".to_string(),
            "some/model".to_string(),
        );
        assert_eq!(
            openrouter.url,
            "https://openrouter.ai/api/v1/chat/completions"
        );

        let openai = ChatCompletionsProvider::openai(
            build_client(),
            "test-key".to_string(),
            "gpt-4o-mini".to_string(),
        );
        assert_eq!(openai.url, "https://api.openai.com/v1/chat/completions");
    }

    // ==================== Response parsing ====================

    #[test]
    fn test_parse_gemini_response_joins_parts() {
        let json = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "SELECT COUNT(*) " },
                            { "text": "FROM STUDENT;" }
                        ]
                    }
                }
            ]
        });
        assert_eq!(
            parse_gemini_response(&json).unwrap(),
            "SELECT COUNT(*) FROM STUDENT;"
        );
    }

    #[test]
    fn test_parse_gemini_response_missing_candidates() {
        let err = parse_gemini_response(&serde_json::json!({})).unwrap_err();
        match err {
            GenerationError::ParseError(msg) => assert!(msg.contains("candidates")),
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_anthropic_response() {
        let json = serde_json::json!({
            "content": [ { "type": "text", "text": "SELECT * FROM STUDENT;" } ]
        });
        assert_eq!(
            parse_anthropic_response(&json).unwrap(),
            "SELECT * FROM STUDENT;"
        );
        assert!(parse_anthropic_response(&serde_json::json!({ "content": [] })).is_err());
    }

    #[test]
    fn test_parse_chat_completions_response() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "SELECT NAME FROM STUDENT;" } }
            ]
        });
        assert_eq!(
            parse_chat_completions_response(&json).unwrap(),
            "SELECT NAME FROM STUDENT;"
        );

        let err = parse_chat_completions_response(&serde_json::json!({ "choices": [] }))
            .unwrap_err();
        assert!(matches!(err, GenerationError::ParseError(_)));
    }

    #[test]
    fn test_timeout_constants() {
        assert_eq!(CONNECT_TIMEOUT.as_secs(), 30);
        assert_eq!(REQUEST_TIMEOUT.as_secs(), 120);
    }
}
