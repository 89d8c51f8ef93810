//! Schema introspection and snapshot caching.
//!
//! One `SchemaSnapshot` is built per database from read-only catalog queries
//! and cached in a single slot. Schemas are static for the lifetime of a run,
//! so the snapshot is recomputed only after the active database switches.
//! The three textual renderings the rest of the harness consumes all derive
//! from the same snapshot.

use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use crate::db::sqlite::{self, SAMPLE_ROW_LIMIT};
use crate::db::Row;
use crate::error::{EvalError, Result};

/// Everything the harness knows about one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Table name as enumerated by the catalog.
    pub name: String,
    /// The original CREATE TABLE statement.
    pub create_sql: String,
    /// (column name, declared type) pairs in definition order.
    pub columns: Vec<(String, String)>,
    /// Up to three representative rows.
    pub sample_rows: Vec<Row>,
}

/// Cached description of one database's schema.
///
/// Tables appear in catalog enumeration order, which is stable within one
/// connection.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    /// The database this snapshot was taken from.
    pub database_id: String,
    /// Per-table schema and samples.
    pub tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    /// One CREATE TABLE statement per user table, newline-joined.
    pub fn create_statements(&self) -> String {
        self.tables
            .iter()
            .map(|t| t.create_sql.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Create statements interleaved with sample rows.
    ///
    /// Each table emits its create statement, a `Three rows from ...` banner,
    /// a tab-separated header of column names, and up to three tab-separated
    /// data rows. Empty tables still emit the header.
    pub fn schema_with_samples(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&table.create_sql);
            out.push_str(";\n\n");

            out.push_str(&format!("Three rows from {} table:\n", table.name));
            let header = table
                .columns
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join("\t");
            out.push_str(&header);
            out.push('\n');

            for row in &table.sample_rows {
                let line = row
                    .iter()
                    .map(|v| v.to_display_string())
                    .collect::<Vec<_>>()
                    .join("\t");
                out.push_str(&line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Human-readable table/column listing.
    pub fn tables_and_columns(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("Table: {}\n", table.name));
            for (name, data_type) in &table.columns {
                out.push_str(&format!("  Column: {name}, Type: {data_type}\n"));
            }
        }
        out
    }
}

/// Builds and caches schema snapshots, one database at a time.
#[derive(Debug, Default)]
pub struct SchemaIntrospector {
    cached: Option<SchemaSnapshot>,
    fetches: u64,
}

impl SchemaIntrospector {
    /// Creates an introspector with an empty cache slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots actually fetched from a database.
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    /// Returns the snapshot for `db_id`, fetching it only when the cached
    /// one belongs to a different database.
    ///
    /// The caller must pass a connection bound to `db_id`; the dataset layer
    /// guarantees this by selecting through the connection cache first.
    pub async fn snapshot(
        &mut self,
        conn: &mut SqliteConnection,
        db_id: &str,
    ) -> Result<&SchemaSnapshot> {
        let hit = self
            .cached
            .as_ref()
            .is_some_and(|s| s.database_id == db_id);

        if !hit {
            let snapshot = fetch_snapshot(conn, db_id).await?;
            debug!(
                "introspected {} tables from {db_id}",
                snapshot.tables.len()
            );
            self.cached = Some(snapshot);
            self.fetches += 1;
        }

        match self.cached.as_ref() {
            Some(snapshot) => Ok(snapshot),
            None => Err(EvalError::internal("schema slot empty after fetch")),
        }
    }
}

async fn fetch_snapshot(conn: &mut SqliteConnection, db_id: &str) -> Result<SchemaSnapshot> {
    let names = sqlite::list_tables(conn).await?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let create_sql = sqlite::create_statement(conn, &name).await?;
        let columns = sqlite::table_columns(conn, &name).await?;
        let sample_rows = sqlite::sample_rows(conn, &name, SAMPLE_ROW_LIMIT).await?;
        tables.push(TableSchema {
            name,
            create_sql,
            columns,
            sample_rows,
        });
    }

    Ok(SchemaSnapshot {
        database_id: db_id.to_string(),
        tables,
    })
}
