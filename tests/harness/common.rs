//! Shared fixture helpers.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;

/// Creates `<base>/<db_id>/<db_id>.sqlite` and runs the given statements
/// against it.
pub async fn seed_db(base: &Path, db_id: &str, statements: &[&str]) {
    let dir = base.join(db_id);
    std::fs::create_dir_all(&dir).unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.join(format!("{db_id}.sqlite")))
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    for statement in statements {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();
}

/// Writes a question JSON file and returns its path.
pub fn write_questions(base: &Path, contents: &str) -> std::path::PathBuf {
    let path = base.join("questions.json");
    std::fs::write(&path, contents).unwrap();
    path
}
