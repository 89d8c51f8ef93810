//! Dataset catalog.
//!
//! Maps a logical corpus name to the concrete question-file and database
//! paths under a data root, plus the record transform that corpus needs.

use std::path::{Path, PathBuf};

use crate::dataset::question::{self, RecordTransform};
use crate::error::{EvalError, Result};

/// Concrete file locations and loader hooks for one corpus.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Directory holding `<db_id>/<db_id>.sqlite` databases.
    pub base_path: PathBuf,

    /// The question JSON file.
    pub data_path: PathBuf,

    /// Field normalization for this corpus.
    pub transform: RecordTransform,
}

impl DatasetConfig {
    /// A layout with explicitly given paths and standard field names.
    pub fn custom(base_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            data_path: data_path.into(),
            transform: question::standard_record,
        }
    }
}

/// Resolves a corpus name to its conventional layout under `data_root`.
///
/// Known corpora: `bird` (dev split) and `spider` (dev split).
pub fn resolve(name: &str, data_root: &Path) -> Result<DatasetConfig> {
    match name.to_lowercase().as_str() {
        "bird" => Ok(DatasetConfig {
            base_path: data_root.join("BIRD/dev/dev_databases"),
            data_path: data_root.join("BIRD/dev/dev.json"),
            transform: question::standard_record,
        }),
        "spider" => Ok(DatasetConfig {
            base_path: data_root.join("Spider/database"),
            data_path: data_root.join("Spider/dev.json"),
            transform: question::spider_record,
        }),
        other => Err(EvalError::config(format!(
            "unknown dataset '{other}' (expected: bird, spider)"
        ))),
    }
}
