//! Anthropic LLM client implementation.
//!
//! Implements the LlmClient trait for Anthropic's messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{EvalError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Anthropic API base URL.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum tokens to generate.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic client configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (e.g., "claude-3-5-sonnet-latest").
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Anthropic LLM client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicClient {
    /// Creates a new Anthropic client with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EvalError::llm(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `ANTHROPIC_API_KEY` for the API key; the model comes from the
    /// caller (config or CLI).
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| EvalError::llm("ANTHROPIC_API_KEY environment variable not set"))?;

        Self::new(AnthropicConfig::new(api_key, model))
    }

    /// Extracts the system message and converts remaining messages to
    /// Anthropic format.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system = None;
        let mut converted = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    // Anthropic uses a separate system parameter
                    system = Some(msg.content.clone());
                }
                Role::User => {
                    converted.push(AnthropicMessage {
                        role: "user".to_string(),
                        content: msg.content.clone(),
                    });
                }
                Role::Assistant => {
                    converted.push(AnthropicMessage {
                        role: "assistant".to_string(),
                        content: msg.content.clone(),
                    });
                }
            }
        }

        (system, converted)
    }

    /// Parses an API error response.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> EvalError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return EvalError::llm("Authentication failed. Check your ANTHROPIC_API_KEY.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return EvalError::llm("Rate limited. Please wait and try again.");
        }

        // Try to parse error message from response
        if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(body) {
            return EvalError::llm(format!(
                "Anthropic API error: {}",
                error_response.error.message
            ));
        }

        EvalError::llm(format!("Anthropic API error ({status}): {body}"))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let (system, converted_messages) = Self::convert_messages(messages);

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            messages: converted_messages,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvalError::llm("Request timed out. Try again.")
                } else if e.is_connect() {
                    EvalError::llm("Failed to connect to Anthropic API. Check your network.")
                } else {
                    EvalError::llm(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EvalError::llm(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let response: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| EvalError::llm(format!("Failed to parse response: {e}")))?;

        // Extract text from content blocks
        let text = response
            .content
            .into_iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    Some(block.text)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(EvalError::llm("No response from Anthropic"));
        }

        Ok(text)
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicError,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnthropicConfig::new("sk-ant-test", "claude-3-5-sonnet-latest");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_config_builders() {
        let config = AnthropicConfig::new("sk-ant-test", "claude-3-5-sonnet-latest")
            .with_timeout(90)
            .with_max_tokens(1024);
        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn test_convert_messages_splits_system() {
        let messages = vec![
            Message::system("You generate SQL."),
            Message::user("How many singers are there?"),
        ];

        let (system, converted) = AnthropicClient::convert_messages(&messages);

        assert_eq!(system.as_deref(), Some("You generate SQL."));
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "user");
    }

    #[test]
    fn test_parse_error_unauthorized() {
        let error = AnthropicClient::parse_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(error.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_parse_error_with_message() {
        let body = r#"{"error":{"message":"model not found"}}"#;
        let error = AnthropicClient::parse_error(reqwest::StatusCode::NOT_FOUND, body);
        assert!(error.to_string().contains("model not found"));
    }
}
