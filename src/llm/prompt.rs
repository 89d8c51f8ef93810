//! Prompt construction for SQL generation.
//!
//! Builds the zero-shot prompt: a system message carrying the database
//! schema and output rules, and a user message carrying the question plus
//! any evidence hint the dataset supplies.

use crate::llm::types::Message;

/// System prompt template for the SQL generator.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a SQL generator for a SQLite database. Generate one SQL query that answers the user's question.

DATABASE SCHEMA:
{schema}

INSTRUCTIONS:
- Generate only valid SQLite SQL
- Return ONLY the SQL query, no explanations
- Use the exact table and column names from the schema
- Use appropriate JOINs where the question spans tables

OUTPUT FORMAT:
Return the SQL query wrapped in ```sql code blocks."#;

/// Builds the system prompt with the schema text injected.
pub fn build_system_prompt(schema_text: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace("{schema}", schema_text)
}

/// Builds the complete message list for one generation request.
pub fn build_messages(schema_text: &str, question: &str, evidence: Option<&str>) -> Vec<Message> {
    let user_content = match evidence {
        Some(hint) if !hint.trim().is_empty() => {
            format!("Question: {question}\nHint: {hint}")
        }
        _ => format!("Question: {question}"),
    };

    vec![
        Message::system(build_system_prompt(schema_text)),
        Message::user(user_content),
    ]
}
