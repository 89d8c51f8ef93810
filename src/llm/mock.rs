//! Mock LLM client for testing.
//!
//! Returns canned SQL based on input patterns, so the full generation path
//! (prompt -> client -> parser) can run without network access or API keys.

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response), checked in order.
    custom_responses: Vec<(String, String)>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When any message in the request contains `pattern`
    /// (case-insensitive), the mock returns `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("count") {
            return "```sql\nSELECT COUNT(*) FROM singer;\n```".to_string();
        }

        "```sql\nSELECT * FROM singer;\n```".to_string()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let combined = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(self.mock_response(&combined))
    }
}
