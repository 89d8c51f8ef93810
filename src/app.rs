//! Evaluation run orchestration.
//!
//! Walks the loaded questions, asks the generator for a candidate query per
//! question, scores it against the gold query, and accumulates a report.
//! Every per-row failure is absorbed here: a run over thousands of rows must
//! never halt because one row went wrong.

use tracing::{error, info, warn};

use crate::dataset::EvaluationDataset;
use crate::error::EvalError;
use crate::llm::SqlGenerator;

/// Aggregated outcome of one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rows whose candidate result set matched the gold result set.
    pub matched: usize,

    /// Rows scored 0 (mismatch or rejected candidate).
    pub mismatched: usize,

    /// Rows where generation itself failed; scored 0.
    pub generation_errors: usize,

    /// Rows excluded because the gold query failed (exclude policy).
    pub gold_errors: usize,

    /// Rows skipped because the database could not be opened.
    pub connection_errors: usize,
}

impl RunReport {
    /// Rows that entered the accuracy denominator.
    pub fn scored(&self) -> usize {
        self.matched + self.mismatched + self.generation_errors
    }

    /// Execution accuracy over the scored rows.
    pub fn accuracy(&self) -> f64 {
        if self.scored() == 0 {
            0.0
        } else {
            self.matched as f64 / self.scored() as f64
        }
    }

    /// Renders the run summary.
    pub fn summary(&self, dataset: &EvaluationDataset) -> String {
        let timings = dataset.timings();
        format!(
            "scored {} questions: {} matched, {} mismatched, {} generation failures\n\
             excluded {} rows with failing gold queries, skipped {} rows with unreachable databases\n\
             execution accuracy: {:.3}\n\
             candidate execution time: {:.2}s total, gold execution time: {:.2}s total",
            self.scored(),
            self.matched,
            self.mismatched,
            self.generation_errors,
            self.gold_errors,
            self.connection_errors,
            self.accuracy(),
            timings.total_candidate.as_secs_f64(),
            timings.total_gold.as_secs_f64(),
        )
    }
}

/// Runs the full generate-and-score loop.
///
/// `limit` caps the number of questions evaluated; `None` runs them all.
pub async fn run_evaluation(
    dataset: &mut EvaluationDataset,
    generator: &dyn SqlGenerator,
    limit: Option<usize>,
) -> RunReport {
    let total = limit.unwrap_or(usize::MAX).min(dataset.len());
    let mut report = RunReport::default();

    for index in 0..total {
        let Some(question) = dataset.get_question(index).cloned() else {
            break;
        };

        let schema_text = match dataset.get_schema_text(&question.db_id).await {
            Ok(text) => text,
            Err(e) => {
                // Without a reachable database neither generation nor
                // scoring can proceed.
                error!("question {index}: {e}");
                report.connection_errors += 1;
                continue;
            }
        };

        let candidate = match generator
            .generate_sql(&schema_text, &question.question, question.evidence.as_deref())
            .await
        {
            Ok(sql) => sql,
            Err(e) => {
                warn!("question {index}: generation failed: {e}");
                report.generation_errors += 1;
                continue;
            }
        };

        match dataset
            .execute_and_score(&candidate, &question.gold_sql, &question.db_id)
            .await
        {
            Ok(1) => {
                info!("question {index}: match");
                report.matched += 1;
            }
            Ok(_) => {
                info!("question {index}: mismatch");
                report.mismatched += 1;
            }
            Err(EvalError::Data(msg)) => {
                warn!("question {index}: excluded: {msg}");
                report.gold_errors += 1;
            }
            Err(e) => {
                error!("question {index}: {e}");
                report.connection_errors += 1;
            }
        }
    }

    report
}

/// Outcome of a gold sanity pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoldCheckReport {
    /// Gold queries the engine accepted.
    pub ok: usize,
    /// Gold queries the engine rejected.
    pub failed: usize,
    /// Rows skipped because the database could not be opened.
    pub skipped: usize,
}

impl GoldCheckReport {
    /// Renders the sanity-check summary.
    pub fn summary(&self) -> String {
        format!(
            "gold check: {} ok, {} failed, {} skipped",
            self.ok, self.failed, self.skipped
        )
    }
}

/// Executes every gold query without generation or comparison.
pub async fn run_gold_check(
    dataset: &mut EvaluationDataset,
    limit: Option<usize>,
) -> GoldCheckReport {
    let total = limit.unwrap_or(usize::MAX).min(dataset.len());
    let mut report = GoldCheckReport::default();

    for index in 0..total {
        let Some(question) = dataset.get_question(index).cloned() else {
            break;
        };

        match dataset
            .execute_only(&question.gold_sql, &question.db_id)
            .await
        {
            Ok(1) => report.ok += 1,
            Ok(_) => {
                warn!("question {index}: gold query rejected on {}", question.db_id);
                report.failed += 1;
            }
            Err(e) => {
                error!("question {index}: {e}");
                report.skipped += 1;
            }
        }
    }

    report
}
