//! Single-slot connection cache.
//!
//! An evaluation run walks thousands of questions that cluster by database,
//! so the cache holds exactly one live connection and switches it only when
//! the requested database id changes. The slot is the single place where the
//! switch happens; callers never reconnect inline.

use std::path::{Path, PathBuf};

use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use crate::db::sqlite;
use crate::error::Result;

/// File extension of evaluation databases.
const DB_EXTENSION: &str = "sqlite";

/// Owns the one active database connection, keyed by database id.
#[derive(Debug)]
pub struct ConnectionCache {
    base_path: PathBuf,
    current: Option<ActiveHandle>,
    opens: u64,
}

#[derive(Debug)]
struct ActiveHandle {
    db_id: String,
    conn: SqliteConnection,
}

impl ConnectionCache {
    /// Creates an empty cache over the given database base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            current: None,
            opens: 0,
        }
    }

    /// Resolves a database id to its on-disk path.
    ///
    /// Layout convention: `<base_path>/<db_id>/<db_id>.sqlite`.
    pub fn db_path(&self, db_id: &str) -> PathBuf {
        self.base_path
            .join(db_id)
            .join(format!("{db_id}.{DB_EXTENSION}"))
    }

    /// The id the active handle is bound to, if any.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|h| h.db_id.as_str())
    }

    /// Number of connections opened over the cache's lifetime.
    pub fn opens(&self) -> u64 {
        self.opens
    }

    /// The base directory databases are resolved under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the live connection for `db_id`, opening one only on a key
    /// change.
    ///
    /// A hit on the cached id performs no I/O. A miss opens the resolved
    /// file and replaces the slot, dropping the previous handle and any
    /// cursor state it held. A missing or rejected file fails with
    /// `EvalError::Connection`, which is fatal for the current evaluation
    /// row, not the run.
    pub async fn select(&mut self, db_id: &str) -> Result<&mut SqliteConnection> {
        let hit = self
            .current
            .as_ref()
            .is_some_and(|h| h.db_id == db_id);

        if !hit {
            let path = self.db_path(db_id);
            debug!("switching database to {db_id} ({})", path.display());
            let conn = sqlite::open(&path).await?;
            self.current = Some(ActiveHandle {
                db_id: db_id.to_string(),
                conn,
            });
            self.opens += 1;
        }

        match self.current.as_mut() {
            Some(handle) => Ok(&mut handle.conn),
            None => Err(crate::error::EvalError::internal(
                "connection slot empty after select",
            )),
        }
    }
}
