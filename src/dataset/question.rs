//! Question records and the dataset loader.
//!
//! One parametrized loader covers every corpus: a JSON array of records is
//! parsed, run through a per-corpus transform that normalizes field names,
//! and filtered by domain and difficulty. Record order is preserved and
//! defines the index used by `EvaluationDataset::get_question`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{EvalError, Result};

/// One natural-language question with its ground-truth SQL.
///
/// Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    /// The natural-language question.
    pub question: String,

    /// The human-authored reference query.
    #[serde(alias = "SQL")]
    pub gold_sql: String,

    /// Logical database the question targets.
    pub db_id: String,

    /// Optional hint supplied with the question (BIRD-style evidence).
    #[serde(default)]
    pub evidence: Option<String>,

    /// Optional difficulty label.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Per-corpus record normalization, applied before filtering.
pub type RecordTransform = fn(serde_json::Value) -> Result<QuestionRecord>;

/// Parses a record whose gold query is named `SQL` or `gold_sql` (BIRD and
/// plain layouts).
pub fn standard_record(value: serde_json::Value) -> Result<QuestionRecord> {
    serde_json::from_value(value)
        .map_err(|e| EvalError::data(format!("malformed question record: {e}")))
}

/// Parses a Spider record, where the gold query is named `query`.
pub fn spider_record(mut value: serde_json::Value) -> Result<QuestionRecord> {
    if let Some(obj) = value.as_object_mut() {
        if let Some(query) = obj.remove("query") {
            obj.insert("SQL".to_string(), query);
        }
    }
    standard_record(value)
}

/// Domain and difficulty restrictions applied at load time.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Keep only questions targeting one of these database ids. Empty = all.
    pub domains: Vec<String>,

    /// Keep only questions with one of these difficulty labels. Empty = all.
    /// Records without a difficulty label are dropped when this is set.
    pub difficulties: Vec<String>,
}

impl QuestionFilter {
    fn keeps(&self, record: &QuestionRecord) -> bool {
        if !self.domains.is_empty() && !self.domains.contains(&record.db_id) {
            return false;
        }
        if !self.difficulties.is_empty() {
            match &record.difficulty {
                Some(difficulty) => {
                    if !self.difficulties.contains(difficulty) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

/// Loads, transforms, and filters a question file.
///
/// An unreadable file is a configuration-level failure (the run should not
/// start); a malformed record is a data error.
pub fn load_questions(
    path: &Path,
    filter: &QuestionFilter,
    transform: RecordTransform,
) -> Result<Vec<QuestionRecord>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| EvalError::config(format!("cannot read {}: {e}", path.display())))?;

    let raw: Vec<serde_json::Value> = serde_json::from_str(&contents)
        .map_err(|e| EvalError::data(format!("{} is not a JSON array: {e}", path.display())))?;

    let mut questions = Vec::with_capacity(raw.len());
    for value in raw {
        let record = transform(value)?;
        if filter.keeps(&record) {
            questions.push(record);
        }
    }
    Ok(questions)
}
