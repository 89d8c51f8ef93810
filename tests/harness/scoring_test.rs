//! Scoring scenario tests.
//!
//! Exercises `execute_and_score` against real fixture databases: exact
//! matches, order/duplicate insensitivity, genuine mismatches, and rejected
//! candidates.

use sqlgauge::dataset::{EvalOptions, EvaluationDataset, GoldErrorPolicy};
use sqlgauge::error::EvalError;

use super::common::seed_db;

fn dataset(base: &std::path::Path, options: EvalOptions) -> EvaluationDataset {
    EvaluationDataset::from_questions(Vec::new(), base, options)
}

#[tokio::test]
async fn test_exact_match_scores_one() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score(
            "SELECT id FROM t WHERE id=1",
            "SELECT id FROM t WHERE id = 1",
            "t1",
        )
        .await
        .unwrap();

    assert_eq!(score, 1);
}

#[tokio::test]
async fn test_order_and_duplicates_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &[
            "CREATE TABLE nums (val INTEGER)",
            "INSERT INTO nums VALUES (1), (1), (2)",
        ],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    // Candidate returns [(2), (1), (1)], gold returns [(1), (2)].
    let score = ds
        .execute_and_score(
            "SELECT val FROM nums ORDER BY val DESC",
            "SELECT DISTINCT val FROM nums ORDER BY val",
            "t1",
        )
        .await
        .unwrap();

    assert_eq!(score, 1);
}

#[tokio::test]
async fn test_genuine_mismatch_scores_zero() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1), (2)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score("SELECT id FROM t WHERE id = 1", "SELECT id FROM t", "t1")
        .await
        .unwrap();

    assert_eq!(score, 0);
}

#[tokio::test]
async fn test_invalid_candidate_never_runs_gold() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score("SELECT no_such_column FROM t", "SELECT id FROM t", "t1")
        .await
        .unwrap();

    assert_eq!(score, 0);
    // Only the candidate statement executed.
    assert_eq!(ds.executions(), 1);
}

#[tokio::test]
async fn test_arity_mismatch_scores_zero() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score("SELECT id, id FROM t", "SELECT id FROM t", "t1")
        .await
        .unwrap();

    assert_eq!(score, 0);
}

#[tokio::test]
async fn test_null_rows_compare_equal() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &[
            "CREATE TABLE people (name TEXT, age INTEGER)",
            "INSERT INTO people VALUES ('Ann', NULL), ('Bob', 40)",
        ],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score(
            "SELECT name, age FROM people",
            "SELECT name, age FROM people ORDER BY name DESC",
            "t1",
        )
        .await
        .unwrap();

    assert_eq!(score, 1);
}

#[tokio::test]
async fn test_integral_real_matches_integer() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    assert_eq!(
        ds.execute_and_score("SELECT 1.0", "SELECT 1", "t1")
            .await
            .unwrap(),
        1
    );
    // TEXT is never coerced to a numeric.
    assert_eq!(
        ds.execute_and_score("SELECT '1'", "SELECT 1", "t1")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_empty_results_are_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "t1", &["CREATE TABLE t (id INTEGER)"]).await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let score = ds
        .execute_and_score(
            "SELECT id FROM t WHERE id > 5",
            "SELECT id FROM t WHERE id > 9",
            "t1",
        )
        .await
        .unwrap();

    assert_eq!(score, 1);
}

#[tokio::test]
async fn test_gold_failure_exclude_policy_surfaces_data_error() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "t1", &["CREATE TABLE t (id INTEGER)"]).await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let err = ds
        .execute_and_score("SELECT id FROM t", "SELECT ghost FROM t", "t1")
        .await
        .unwrap_err();

    assert!(matches!(err, EvalError::Data(_)));
}

#[tokio::test]
async fn test_gold_failure_score_zero_policy() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "t1", &["CREATE TABLE t (id INTEGER)"]).await;
    let options = EvalOptions {
        gold_policy: GoldErrorPolicy::ScoreZero,
        ..Default::default()
    };
    let mut ds = dataset(dir.path(), options);

    let score = ds
        .execute_and_score("SELECT id FROM t", "SELECT ghost FROM t", "t1")
        .await
        .unwrap();

    assert_eq!(score, 0);
}

#[tokio::test]
async fn test_missing_database_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = dataset(dir.path(), EvalOptions::default());

    let err = ds
        .execute_and_score("SELECT 1", "SELECT 1", "ghost")
        .await
        .unwrap_err();

    assert!(matches!(err, EvalError::Connection(_)));
}

#[tokio::test]
async fn test_execute_only_reports_engine_success() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "t1",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path(), EvalOptions::default());

    assert_eq!(ds.execute_only("SELECT id FROM t", "t1").await.unwrap(), 1);
    assert_eq!(
        ds.execute_only("SELECT ghost FROM t", "t1").await.unwrap(),
        0
    );
}
