//! Key-value database operations

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::helpers::parse_datetime;
use crate::models::KvEntry;

/// Get a value by key
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// Insert or replace a value
pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

/// Delete a key, returning whether it existed
pub fn delete_value(conn: &Connection, key: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(deleted > 0)
}

/// List all entries ordered by key
pub fn list_entries(conn: &Connection) -> Result<Vec<KvEntry>> {
    let mut stmt = conn.prepare("SELECT key, value, updated_at FROM kv_store ORDER BY key")?;

    let entries = stmt
        .query_map([], |row| {
            Ok(KvEntry {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: parse_datetime(&row.get::<_, String>(2)?)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}
