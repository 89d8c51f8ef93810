//! The SQL generation collaborator.
//!
//! The harness only depends on the `SqlGenerator` seam: give it schema text,
//! a question, and an optional hint; get back one SQL statement. The default
//! implementation drives an `LlmClient` through the zero-shot prompt and the
//! response parser.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::llm::parser::extract_sql;
use crate::llm::prompt::build_messages;
use crate::llm::LlmClient;

/// Produces a candidate SQL statement for a question.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Generates one SQL statement answering `question` against the schema
    /// described by `schema_text`.
    async fn generate_sql(
        &self,
        schema_text: &str,
        question: &str,
        evidence: Option<&str>,
    ) -> Result<String>;
}

/// `SqlGenerator` backed by any `LlmClient`.
pub struct LlmSqlGenerator {
    client: Box<dyn LlmClient>,
}

impl LlmSqlGenerator {
    /// Wraps an LLM client.
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SqlGenerator for LlmSqlGenerator {
    async fn generate_sql(
        &self,
        schema_text: &str,
        question: &str,
        evidence: Option<&str>,
    ) -> Result<String> {
        let messages = build_messages(schema_text, question, evidence);
        let response = self.client.complete(&messages).await?;
        let sql = extract_sql(&response);
        debug!("generated SQL for question {question:?}:\n{sql}");
        Ok(sql)
    }
}
