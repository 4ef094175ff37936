//! Database schema definitions.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    tracing::debug!("Schema migrations applied");
    Ok(())
}

// `id` preserves insertion order for paging.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS message_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id INTEGER NOT NULL UNIQUE,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    color INTEGER NOT NULL,
    channel TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;
