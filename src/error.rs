//! Error types for sqlgauge.
//!
//! Defines the main error enum used throughout the harness.

use thiserror::Error;

/// Main error type for evaluation operations.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Database connection errors (file missing, engine rejected the file, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, unknown identifiers, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Dataset integrity errors (unreadable question file, failing gold query, etc.)
    #[error("Data error: {0}")]
    Data(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EvalError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a data error with the given message.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Data(_) => "Data Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using EvalError.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = EvalError::connection("no such file: data/db/college/college.sqlite");
        assert_eq!(
            err.to_string(),
            "Connection error: no such file: data/db/college/college.sqlite"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = EvalError::query("no such column: emal");
        assert_eq!(err.to_string(), "Query error: no such column: emal");
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_data() {
        let err = EvalError::data("gold query failed for question 17");
        assert_eq!(
            err.to_string(),
            "Data error: gold query failed for question 17"
        );
        assert_eq!(err.category(), "Data Error");
    }

    #[test]
    fn test_error_display_llm() {
        let err = EvalError::llm("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "LLM error: Rate limited. Please wait.");
        assert_eq!(err.category(), "LLM Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = EvalError::config("missing field 'data_root'");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'data_root'"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EvalError>();
    }
}
