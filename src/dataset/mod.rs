//! Evaluation dataset: the integration surface of the harness.
//!
//! `EvaluationDataset` composes the connection cache, schema introspector,
//! query executor, and result comparator into the operations run scripts and
//! generation agents call: fetch a question, render schema text, and
//! execute-and-score a candidate query.
//!
//! One instance owns one connection slot and one schema slot, so it is
//! strictly sequential: public operations take `&mut self`, and parallel
//! workers must each construct their own instance.

pub mod cache;
pub mod catalog;
pub mod question;
pub mod schema;

pub use cache::ConnectionCache;
pub use catalog::DatasetConfig;
pub use question::{QuestionFilter, QuestionRecord};
pub use schema::{SchemaIntrospector, SchemaSnapshot};

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::db::{rows_equivalent, QueryExecutor};
use crate::error::{EvalError, Result};

/// How a failing gold query affects scoring.
///
/// A gold failure is a dataset-integrity fault, not a property of the
/// candidate under evaluation, so the policy is explicit rather than folded
/// silently into a zero score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoldErrorPolicy {
    /// Surface the row as a data error so the driver can exclude it from the
    /// accuracy denominator.
    #[default]
    Exclude,

    /// Score the row 0 and keep it in the denominator.
    ScoreZero,
}

impl FromStr for GoldErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "score-zero" | "score_zero" => Ok(Self::ScoreZero),
            _ => Err(format!(
                "Invalid gold error policy: {s}. Expected: exclude or score-zero"
            )),
        }
    }
}

/// Tunables for one dataset instance.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Policy for gold-query failures.
    pub gold_policy: GoldErrorPolicy,

    /// Optional bound on a single statement's execution time. `None` (the
    /// default) waits for completion, matching the reference behavior.
    pub query_timeout: Option<Duration>,
}

/// Per-instance execution-time counters, readable after each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionTimings {
    /// Elapsed time of the most recent candidate execution.
    pub last_candidate: Duration,
    /// Cumulative candidate execution time.
    pub total_candidate: Duration,
    /// Elapsed time of the most recent gold execution.
    pub last_gold: Duration,
    /// Cumulative gold execution time.
    pub total_gold: Duration,
}

impl ExecutionTimings {
    fn record_candidate(&mut self, elapsed: Duration) {
        self.last_candidate = elapsed;
        self.total_candidate += elapsed;
    }

    fn record_gold(&mut self, elapsed: Duration) {
        self.last_gold = elapsed;
        self.total_gold += elapsed;
    }
}

/// A loaded question collection plus the machinery to score queries
/// against its databases.
#[derive(Debug)]
pub struct EvaluationDataset {
    questions: Vec<QuestionRecord>,
    connections: ConnectionCache,
    introspector: SchemaIntrospector,
    executor: QueryExecutor,
    gold_policy: GoldErrorPolicy,
    timings: ExecutionTimings,
}

impl EvaluationDataset {
    /// Loads questions from a corpus layout and prepares an instance over
    /// its database directory.
    pub fn load(
        config: &DatasetConfig,
        filter: &QuestionFilter,
        options: EvalOptions,
    ) -> Result<Self> {
        let questions = question::load_questions(&config.data_path, filter, config.transform)?;
        info!(
            "loaded {} questions from {}",
            questions.len(),
            config.data_path.display()
        );
        Ok(Self::from_questions(questions, &config.base_path, options))
    }

    /// Builds an instance from already-materialized questions.
    pub fn from_questions(
        questions: Vec<QuestionRecord>,
        base_path: impl Into<std::path::PathBuf>,
        options: EvalOptions,
    ) -> Self {
        Self {
            questions,
            connections: ConnectionCache::new(base_path),
            introspector: SchemaIntrospector::new(),
            executor: QueryExecutor::with_timeout(options.query_timeout),
            gold_policy: options.gold_policy,
            timings: ExecutionTimings::default(),
        }
    }

    /// Number of loaded questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// True when no questions survived loading/filtering.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The question at `index`, in source-file order.
    pub fn get_question(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    /// Execution-time counters for this instance.
    pub fn timings(&self) -> &ExecutionTimings {
        &self.timings
    }

    /// Total statements executed by this instance.
    pub fn executions(&self) -> u64 {
        self.executor.calls()
    }

    /// Total connections opened by this instance.
    pub fn connections_opened(&self) -> u64 {
        self.connections.opens()
    }

    /// Total schema snapshots fetched by this instance.
    pub fn schema_fetches(&self) -> u64 {
        self.introspector.fetches()
    }

    /// Executes the candidate and gold queries and scores them by result-set
    /// equivalence.
    ///
    /// Returns `Ok(1)` when the two result sets are set-equivalent, `Ok(0)`
    /// otherwise. A candidate rejected by the engine scores 0 immediately
    /// and the gold query is not executed. A failing gold query is handled
    /// per the configured `GoldErrorPolicy`. A missing database propagates
    /// as `EvalError::Connection`; the caller decides whether to skip the
    /// row.
    pub async fn execute_and_score(
        &mut self,
        candidate_sql: &str,
        gold_sql: &str,
        db_id: &str,
    ) -> Result<u8> {
        let conn = self.connections.select(db_id).await?;
        let candidate = self.executor.execute(conn, candidate_sql).await;
        self.timings.record_candidate(candidate.elapsed);

        if let Some(err) = &candidate.error {
            info!("candidate query rejected on {db_id}: {err}");
            return Ok(0);
        }

        let conn = self.connections.select(db_id).await?;
        let gold = self.executor.execute(conn, gold_sql).await;
        self.timings.record_gold(gold.elapsed);

        if let Some(err) = &gold.error {
            warn!("gold query failed on {db_id}: {err}");
            return match self.gold_policy {
                GoldErrorPolicy::ScoreZero => Ok(0),
                GoldErrorPolicy::Exclude => Err(EvalError::data(format!(
                    "gold query failed on {db_id}: {err}"
                ))),
            };
        }

        Ok(u8::from(rows_equivalent(&candidate.rows, &gold.rows)))
    }

    /// Executes a single query and reports engine-level success (`1`) or
    /// failure (`0`), without any comparison.
    ///
    /// Used to sanity-check gold queries before a run.
    pub async fn execute_only(&mut self, sql: &str, db_id: &str) -> Result<u8> {
        let conn = self.connections.select(db_id).await?;
        let result = self.executor.execute(conn, sql).await;

        match &result.error {
            Some(err) => {
                info!("query failed on {db_id}: {err}");
                Ok(0)
            }
            None => Ok(1),
        }
    }

    /// Schema text with create statements and sample rows, for generation
    /// prompts.
    pub async fn get_schema_text(&mut self, db_id: &str) -> Result<String> {
        self.render_schema(db_id, SchemaSnapshot::schema_with_samples)
            .await
    }

    /// Create statements only.
    pub async fn get_create_statements(&mut self, db_id: &str) -> Result<String> {
        self.render_schema(db_id, SchemaSnapshot::create_statements)
            .await
    }

    /// Table/column listing.
    pub async fn get_tables_and_columns(&mut self, db_id: &str) -> Result<String> {
        self.render_schema(db_id, SchemaSnapshot::tables_and_columns)
            .await
    }

    async fn render_schema(
        &mut self,
        db_id: &str,
        render: fn(&SchemaSnapshot) -> String,
    ) -> Result<String> {
        let conn = self.connections.select(db_id).await?;
        let snapshot = self.introspector.snapshot(conn, db_id).await?;
        let text = render(snapshot);
        debug!("schema text for {db_id}:\n{text}");
        Ok(text)
    }
}
