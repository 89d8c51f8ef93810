//! End-to-end runs: question file -> generation -> scoring -> report.

use sqlgauge::app::{run_evaluation, run_gold_check};
use sqlgauge::dataset::{DatasetConfig, EvalOptions, EvaluationDataset, QuestionFilter};
use sqlgauge::llm::{LlmSqlGenerator, MockLlmClient};

use super::common::{seed_db, write_questions};

const QUESTIONS_JSON: &str = r#"[
    {"question": "How many singers are there?", "SQL": "SELECT COUNT(*) FROM singer", "db_id": "concert", "difficulty": "simple"},
    {"question": "List all singer names", "SQL": "SELECT name FROM singer", "db_id": "concert", "difficulty": "simple"},
    {"question": "Who is the oldest singer?", "SQL": "SELECT name FROM singer ORDER BY age DESC LIMIT 1", "db_id": "concert", "difficulty": "moderate"}
]"#;

async fn fixture(dir: &std::path::Path) -> EvaluationDataset {
    seed_db(
        dir,
        "concert",
        &[
            "CREATE TABLE singer (id INTEGER, name TEXT, age INTEGER)",
            "INSERT INTO singer VALUES (1, 'Joe', 52), (2, 'Ann', 43)",
        ],
    )
    .await;
    let questions_path = write_questions(dir, QUESTIONS_JSON);
    let config = DatasetConfig::custom(dir, questions_path);

    EvaluationDataset::load(&config, &QuestionFilter::default(), EvalOptions::default()).unwrap()
}

#[tokio::test]
async fn test_questions_load_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let ds = fixture(dir.path()).await;

    assert_eq!(ds.len(), 3);
    assert_eq!(ds.get_question(0).unwrap().question, "How many singers are there?");
    assert_eq!(
        ds.get_question(2).unwrap().gold_sql,
        "SELECT name FROM singer ORDER BY age DESC LIMIT 1"
    );
}

#[tokio::test]
async fn test_difficulty_filter_applies_at_load() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "concert", &["CREATE TABLE singer (id INTEGER)"]).await;
    let questions_path = write_questions(dir.path(), QUESTIONS_JSON);
    let config = DatasetConfig::custom(dir.path(), questions_path);
    let filter = QuestionFilter {
        difficulties: vec!["moderate".to_string()],
        ..Default::default()
    };

    let ds = EvaluationDataset::load(&config, &filter, EvalOptions::default()).unwrap();

    assert_eq!(ds.len(), 1);
    assert_eq!(ds.get_question(0).unwrap().question, "Who is the oldest singer?");
}

#[tokio::test]
async fn test_full_run_with_mock_generator() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = fixture(dir.path()).await;

    // Two canned answers are right, one is wrong.
    let client = MockLlmClient::new()
        .with_response(
            "how many singers",
            "```sql\nSELECT COUNT(id) FROM singer;\n```",
        )
        .with_response("singer names", "```sql\nSELECT name FROM singer;\n```")
        .with_response("oldest singer", "```sql\nSELECT name FROM singer ORDER BY age LIMIT 1;\n```");
    let generator = LlmSqlGenerator::new(Box::new(client));

    let report = run_evaluation(&mut ds, &generator, None).await;

    assert_eq!(report.scored(), 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.mismatched, 1);
    assert_eq!(report.connection_errors, 0);

    // One connection and one schema snapshot served all three rows.
    assert_eq!(ds.connections_opened(), 1);
    assert_eq!(ds.schema_fetches(), 1);

    let summary = report.summary(&ds);
    assert!(summary.contains("2 matched"));
    assert!(summary.contains("execution accuracy: 0.667"));
}

#[tokio::test]
async fn test_gold_check_over_loaded_questions() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = fixture(dir.path()).await;

    let report = run_gold_check(&mut ds, None).await;

    assert_eq!(report.ok, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn test_timings_are_exposed_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = fixture(dir.path()).await;
    let generator = LlmSqlGenerator::new(Box::new(MockLlmClient::new()));

    run_evaluation(&mut ds, &generator, Some(1)).await;

    let timings = ds.timings();
    assert!(timings.total_candidate >= timings.last_candidate);
    // The mock's default answer executes, so the gold side ran too.
    assert!(timings.total_gold > std::time::Duration::ZERO || ds.executions() >= 1);
}
