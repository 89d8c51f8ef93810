//! Configuration management for sqlgauge.
//!
//! Handles loading configuration from TOML files, with CLI overrides applied
//! on top. Precedence: CLI arguments > config file > built-in defaults.
//! API keys are never stored here; they come from the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::dataset::{catalog, DatasetConfig, EvalOptions, QuestionFilter};
use crate::error::{EvalError, Result};
use crate::llm::LlmProvider;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Dataset location and filtering.
    #[serde(default)]
    pub dataset: DatasetSection,

    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmSection,

    /// Scoring and execution settings.
    #[serde(default)]
    pub evaluation: EvaluationSection,
}

/// Dataset location and filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSection {
    /// Root directory the corpus layouts live under.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Logical corpus name ("bird" or "spider").
    #[serde(default = "default_corpus")]
    pub corpus: String,

    /// Explicit database directory, overriding the corpus layout.
    pub db_base_path: Option<PathBuf>,

    /// Explicit question file, overriding the corpus layout.
    pub questions_path: Option<PathBuf>,

    /// Keep only these database ids. Empty = all.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Keep only these difficulty labels. Empty = all.
    #[serde(default)]
    pub difficulties: Vec<String>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_corpus() -> String {
    "bird".to_string()
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            corpus: default_corpus(),
            db_base_path: None,
            questions_path: None,
            domains: Vec::new(),
            difficulties: Vec::new(),
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// Provider: "openai", "anthropic", or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name. Falls back to the provider's default when absent.
    pub model: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
        }
    }
}

/// Scoring and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSection {
    /// Policy for gold-query failures: "exclude" or "score-zero".
    #[serde(default = "default_gold_policy")]
    pub gold_error_policy: String,

    /// Optional per-statement timeout in seconds. Absent = wait for
    /// completion.
    pub query_timeout_secs: Option<u64>,
}

fn default_gold_policy() -> String {
    "exclude".to_string()
}

impl Default for EvaluationSection {
    fn default() -> Self {
        Self {
            gold_error_policy: default_gold_policy(),
            query_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a malformed one is a startup
    /// failure.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content).map_err(|e| {
            EvalError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolves the dataset layout, preferring explicit paths over the
    /// corpus catalog.
    pub fn resolve_dataset(&self) -> Result<DatasetConfig> {
        match (&self.dataset.db_base_path, &self.dataset.questions_path) {
            (Some(base), Some(data)) => Ok(DatasetConfig::custom(base, data)),
            (None, None) => catalog::resolve(&self.dataset.corpus, &self.dataset.data_root),
            _ => Err(EvalError::config(
                "db_base_path and questions_path must be set together",
            )),
        }
    }

    /// The question filter configured for this run.
    pub fn question_filter(&self) -> QuestionFilter {
        QuestionFilter {
            domains: self.dataset.domains.clone(),
            difficulties: self.dataset.difficulties.clone(),
        }
    }

    /// The evaluation options configured for this run.
    pub fn eval_options(&self) -> Result<EvalOptions> {
        let gold_policy = self
            .evaluation
            .gold_error_policy
            .parse()
            .map_err(EvalError::config)?;
        Ok(EvalOptions {
            gold_policy,
            query_timeout: self.evaluation.query_timeout_secs.map(Duration::from_secs),
        })
    }

    /// The configured LLM provider.
    pub fn provider(&self) -> Result<LlmProvider> {
        self.llm.provider.parse().map_err(EvalError::config)
    }

    /// The model to use for `provider`.
    pub fn model(&self, provider: LlmProvider) -> String {
        self.llm
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string())
    }
}
