//! SQLite access layer.
//!
//! Provides connection opening for on-disk evaluation databases, the
//! `QueryExecutor` that runs arbitrary SQL with timing and isolated error
//! capture, and the read-only catalog queries the schema introspector builds
//! on. No DDL or DML is ever issued from this module.

use std::path::Path;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Row as SqlxRow, TypeInfo, ValueRef};
use tracing::{info, warn};

use crate::db::{ExecutionResult, Row, Value};
use crate::error::{EvalError, Result};

/// Queries slower than this get their full SQL text logged for diagnosis
/// (accidental cross joins, runaway aggregates).
const SLOW_QUERY_SECS: f64 = 5.0;

/// Sample rows fetched per table for schema snapshots.
pub const SAMPLE_ROW_LIMIT: u32 = 3;

/// Opens a connection to an existing database file.
///
/// The file must already exist: evaluation databases are provided by the
/// dataset, never created here. Connections are read-only so an untrusted
/// candidate query cannot mutate the corpus.
pub async fn open(path: &Path) -> Result<SqliteConnection> {
    if !path.is_file() {
        return Err(EvalError::connection(format!(
            "no such database file: {}",
            path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .read_only(true);

    SqliteConnection::connect_with(&options)
        .await
        .map_err(|e| EvalError::connection(format!("failed to open {}: {e}", path.display())))
}

/// Executes single SQL statements against a live connection.
///
/// Engine errors are captured into the returned `ExecutionResult` rather than
/// raised; a rejected statement is a routine outcome when the SQL comes from
/// a generator under evaluation. Holds a call counter so callers (and tests)
/// can observe how many statements actually ran.
#[derive(Debug, Default)]
pub struct QueryExecutor {
    timeout: Option<Duration>,
    calls: u64,
}

impl QueryExecutor {
    /// Creates an executor with no timeout: queries run to completion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor that aborts statements exceeding `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout, calls: 0 }
    }

    /// Number of statements executed so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Runs one statement, materializing all result rows.
    ///
    /// Elapsed time covers execute+fetch only; connection setup is the
    /// caller's concern and excluded from the measurement.
    pub async fn execute(&mut self, conn: &mut SqliteConnection, sql: &str) -> ExecutionResult {
        self.calls += 1;
        let start = Instant::now();

        let fetched = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, sqlx::query(sql).fetch_all(&mut *conn)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            "query timed out after {:.2}s\nSQL query:\n{sql}",
                            limit.as_secs_f64()
                        );
                        return ExecutionResult::failure(
                            format!("query timed out after {:.2}s", limit.as_secs_f64()),
                            start.elapsed(),
                        );
                    }
                }
            }
            None => sqlx::query(sql).fetch_all(&mut *conn).await,
        };

        let elapsed = start.elapsed();

        match fetched {
            Ok(raw_rows) => {
                log_elapsed(sql, elapsed);
                let rows = raw_rows.iter().map(convert_row).collect();
                ExecutionResult::success(rows, elapsed)
            }
            Err(e) => ExecutionResult::failure(format_query_error(e), elapsed),
        }
    }
}

fn log_elapsed(sql: &str, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    if secs > SLOW_QUERY_SECS {
        info!("query execution time: {secs:.2}s\nSQL query:\n{sql}");
    } else {
        info!("query execution time: {secs:.2}s");
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single cell by its runtime storage class.
///
/// The declared column type is irrelevant here: SQLite columns hold values of
/// any class, so the value's own type tag decides the decode.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let raw = match row.try_get_raw(index) {
        Ok(raw) => raw,
        Err(_) => return Value::Null,
    };

    if raw.is_null() {
        return Value::Null;
    }

    match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Blob)
            .unwrap_or(Value::Null),

        // TEXT and anything else the engine reports textually.
        _ => row
            .try_get::<String, _>(index)
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}

/// Extracts the engine's message from a sqlx error.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

/// Double-quotes an identifier for interpolation into catalog SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Enumerates user tables in catalog order.
///
/// The order is implementation-defined but stable within one connection,
/// which is all the snapshot cache needs. Internal `sqlite_*` tables are
/// excluded.
pub async fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(conn)
    .await
    .map_err(|e| EvalError::query(format!("failed to list tables: {e}")))
}

/// Fetches (column name, declared type) pairs for one table.
pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<(String, String)>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table)))
        .fetch_all(conn)
        .await
        .map_err(|e| EvalError::query(format!("failed to fetch columns for {table}: {e}")))?;

    rows.iter()
        .map(|row| {
            let name: String = row
                .try_get("name")
                .map_err(|e| EvalError::query(format!("bad table_info row for {table}: {e}")))?;
            let data_type: String = row
                .try_get("type")
                .map_err(|e| EvalError::query(format!("bad table_info row for {table}: {e}")))?;
            Ok((name, data_type))
        })
        .collect()
}

/// Fetches the CREATE TABLE statement for one table.
pub async fn create_statement(conn: &mut SqliteConnection, table: &str) -> Result<String> {
    let sql: Option<Option<String>> =
        sqlx::query_scalar("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                EvalError::query(format!("failed to fetch create statement for {table}: {e}"))
            })?;

    sql.flatten()
        .ok_or_else(|| EvalError::query(format!("no create statement for table {table}")))
}

/// Fetches up to `limit` representative rows from one table.
pub async fn sample_rows(
    conn: &mut SqliteConnection,
    table: &str,
    limit: u32,
) -> Result<Vec<Row>> {
    let rows = sqlx::query(&format!(
        "SELECT * FROM {} LIMIT {limit}",
        quote_ident(table)
    ))
    .fetch_all(conn)
    .await
    .map_err(|e| EvalError::query(format!("failed to sample rows from {table}: {e}")))?;

    Ok(rows.iter().map(convert_row).collect())
}
