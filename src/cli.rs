//! Command-line argument parsing for sqlgauge.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Execution-based evaluation harness for text-to-SQL generation.
#[derive(Parser, Debug)]
#[command(name = "sqlgauge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Corpus to evaluate (bird, spider)
    #[arg(short = 'c', long, value_name = "NAME")]
    pub corpus: Option<String>,

    /// Root directory the corpus layouts live under
    #[arg(long, value_name = "PATH")]
    pub data_root: Option<PathBuf>,

    /// Explicit database directory (requires --questions)
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Explicit question JSON file (requires --db-path)
    #[arg(long, value_name = "PATH")]
    pub questions: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Evaluate at most this many questions
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// LLM provider to use (openai, anthropic, mock)
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<String>,

    /// Model name (overrides the provider default)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Gold-query failure policy (exclude, score-zero)
    #[arg(long, value_name = "POLICY")]
    pub gold_policy: Option<String>,

    /// Only sanity-check the gold queries; no generation or scoring
    #[arg(long)]
    pub gold_check: bool,

    /// Use the mock LLM (no API key required)
    #[arg(long)]
    pub mock_llm: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The config file to load.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("sqlgauge.toml"))
    }

    /// Applies CLI overrides on top of a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(corpus) = &self.corpus {
            config.dataset.corpus = corpus.clone();
        }
        if let Some(data_root) = &self.data_root {
            config.dataset.data_root = data_root.clone();
        }
        if let Some(db_path) = &self.db_path {
            config.dataset.db_base_path = Some(db_path.clone());
        }
        if let Some(questions) = &self.questions {
            config.dataset.questions_path = Some(questions.clone());
        }
        if let Some(llm) = &self.llm {
            config.llm.provider = llm.clone();
        }
        if self.mock_llm {
            config.llm.provider = "mock".to_string();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(policy) = &self.gold_policy {
            config.evaluation.gold_error_policy = policy.clone();
        }
    }
}
