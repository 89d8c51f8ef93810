//! Connection and schema cache behavior.
//!
//! The open/fetch counters on `EvaluationDataset` make the caching
//! observable without reaching into internals.

use pretty_assertions::assert_eq;
use sqlgauge::dataset::{EvalOptions, EvaluationDataset};

use super::common::seed_db;

fn dataset(base: &std::path::Path) -> EvaluationDataset {
    EvaluationDataset::from_questions(Vec::new(), base, EvalOptions::default())
}

#[tokio::test]
async fn test_same_database_opens_one_connection() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "college",
        &["CREATE TABLE t (id INTEGER)", "INSERT INTO t VALUES (1)"],
    )
    .await;
    let mut ds = dataset(dir.path());

    ds.execute_and_score("SELECT id FROM t", "SELECT id FROM t", "college")
        .await
        .unwrap();
    ds.execute_and_score("SELECT id FROM t", "SELECT id FROM t", "college")
        .await
        .unwrap();

    assert_eq!(ds.connections_opened(), 1);
}

#[tokio::test]
async fn test_switching_database_opens_new_connection() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "college", &["CREATE TABLE t (id INTEGER)"]).await;
    seed_db(dir.path(), "flights", &["CREATE TABLE f (id INTEGER)"]).await;
    let mut ds = dataset(dir.path());

    ds.execute_only("SELECT * FROM t", "college").await.unwrap();
    ds.execute_only("SELECT * FROM f", "flights").await.unwrap();

    assert_eq!(ds.connections_opened(), 2);
}

#[tokio::test]
async fn test_single_slot_reopens_on_return() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "a", &["CREATE TABLE t (id INTEGER)"]).await;
    seed_db(dir.path(), "b", &["CREATE TABLE t (id INTEGER)"]).await;
    let mut ds = dataset(dir.path());

    ds.execute_only("SELECT * FROM t", "a").await.unwrap();
    ds.execute_only("SELECT * FROM t", "b").await.unwrap();
    // The slot was destroyed by the switch; coming back costs a new open.
    ds.execute_only("SELECT * FROM t", "a").await.unwrap();

    assert_eq!(ds.connections_opened(), 3);
}

#[tokio::test]
async fn test_schema_text_is_cached_per_database() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "college",
        &[
            "CREATE TABLE student (id INTEGER, name TEXT)",
            "INSERT INTO student VALUES (1, 'Ada')",
        ],
    )
    .await;
    let mut ds = dataset(dir.path());

    let first = ds.get_schema_text("college").await.unwrap();
    let second = ds.get_schema_text("college").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ds.schema_fetches(), 1);
}

#[tokio::test]
async fn test_schema_cache_invalidated_by_switch() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(dir.path(), "college", &["CREATE TABLE student (id INTEGER)"]).await;
    seed_db(dir.path(), "flights", &["CREATE TABLE flight (id INTEGER)"]).await;
    let mut ds = dataset(dir.path());

    let college = ds.get_schema_text("college").await.unwrap();
    let flights = ds.get_schema_text("flights").await.unwrap();

    assert_ne!(college, flights);
    assert_eq!(ds.schema_fetches(), 2);
}

#[tokio::test]
async fn test_all_schema_renderings_share_one_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    seed_db(
        dir.path(),
        "college",
        &["CREATE TABLE student (id INTEGER, name TEXT)"],
    )
    .await;
    let mut ds = dataset(dir.path());

    let samples = ds.get_schema_text("college").await.unwrap();
    let creates = ds.get_create_statements("college").await.unwrap();
    let listing = ds.get_tables_and_columns("college").await.unwrap();

    assert!(samples.contains("Three rows from student table:"));
    assert_eq!(creates, "CREATE TABLE student (id INTEGER, name TEXT)");
    assert!(listing.contains("Table: student"));
    assert!(listing.contains("Column: name, Type: TEXT"));
    assert_eq!(ds.schema_fetches(), 1);
}
