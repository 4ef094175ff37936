//! Echoed message records: one row per bot message sent by `repeat`.

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Platform id of the echoed message.
    pub message_id: u64,
    pub author: String,
    pub content: String,
    pub color: u32,
    /// Channel name at send time.
    pub channel: String,
    /// Unix seconds, UTC.
    pub created_at: i64,
}

impl MessageRecord {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created_at, 0).unwrap_or_default()
    }
}

const RECORD_COLUMNS: &str = "message_id, author, content, color, channel, created_at";

/// Stored ids are SQLite integers, so ids above `i64::MAX` never match a row.
fn stored_id(message_id: u64) -> Option<i64> {
    i64::try_from(message_id).ok()
}

fn sql_id(message_id: u64) -> Result<i64, DbError> {
    i64::try_from(message_id)
        .map_err(|_| DbError::InvalidData(format!("message id out of range: {message_id}")))
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRecord> {
    let raw_id: i64 = row.get(0)?;
    let message_id =
        u64::try_from(raw_id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, raw_id))?;
    let raw_color: i64 = row.get(3)?;
    let color =
        u32::try_from(raw_color).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, raw_color))?;
    Ok(MessageRecord {
        message_id,
        author: row.get(1)?,
        content: row.get(2)?,
        color,
        channel: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    pub fn insert_record(&self, record: &MessageRecord) -> Result<(), DbError> {
        let message_id = sql_id(record.message_id)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message_records
                    (message_id, author, content, color, channel, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    message_id,
                    record.author,
                    record.content,
                    i64::from(record.color),
                    record.channel,
                    record.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn find_record(&self, message_id: u64) -> Result<Option<MessageRecord>, DbError> {
        let Some(message_id) = stored_id(message_id) else {
            return Ok(None);
        };
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM message_records WHERE message_id = ?1"),
                    [message_id],
                    record_from_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    pub fn count_records(&self) -> Result<u64, DbError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM message_records", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }

    /// Records in insertion order, skipping `skip` and returning at most `limit`.
    pub fn list_records(&self, skip: u64, limit: u64) -> Result<Vec<MessageRecord>, DbError> {
        let skip = i64::try_from(skip).map_err(|_| DbError::InvalidData("skip too large".into()))?;
        let limit =
            i64::try_from(limit).map_err(|_| DbError::InvalidData("limit too large".into()))?;
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM message_records ORDER BY id ASC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map([limit, skip], record_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Set the content of one record. Returns false when no record matched.
    pub fn update_record_content(&self, message_id: u64, content: &str) -> Result<bool, DbError> {
        let Some(message_id) = stored_id(message_id) else {
            return Ok(false);
        };
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE message_records SET content = ?1 WHERE message_id = ?2",
                rusqlite::params![content, message_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete one record. Returns false when no record matched.
    pub fn delete_record(&self, message_id: u64) -> Result<bool, DbError> {
        let Some(message_id) = stored_id(message_id) else {
            return Ok(false);
        };
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM message_records WHERE message_id = ?1",
                [message_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete every record. Returns the number removed.
    pub fn delete_all_records(&self) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM message_records", [])?;
            tracing::debug!(removed, "Cleared message records");
            Ok(removed)
        })
    }
}
