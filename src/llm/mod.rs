//! LLM integration for sqlgauge.
//!
//! Provides the generation collaborator: a trait for LLM providers, OpenAI
//! and Anthropic implementations, a mock for tests, and the prompt/parser
//! pair that turns schema text and a question into a candidate SQL
//! statement.

pub mod anthropic;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use generator::{LlmSqlGenerator, SqlGenerator};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::extract_sql;
pub use prompt::{build_messages, build_system_prompt};
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI (GPT models)
    #[default]
    OpenAi,
    /// Anthropic (Claude)
    Anthropic,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }

    /// The model used when the config names none.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-sonnet-latest",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {s}")),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates a generator for the given provider and model.
///
/// API keys are read from the environment (`OPENAI_API_KEY`,
/// `ANTHROPIC_API_KEY`); a missing key is a startup failure, not a per-row
/// one.
pub fn create_generator(provider: LlmProvider, model: &str) -> Result<LlmSqlGenerator> {
    let client: Box<dyn LlmClient> = match provider {
        LlmProvider::OpenAi => Box::new(OpenAiClient::from_env(model)?),
        LlmProvider::Anthropic => Box::new(AnthropicClient::from_env(model)?),
        LlmProvider::Mock => Box::new(MockLlmClient::new()),
    };
    Ok(LlmSqlGenerator::new(client))
}
