//! Database operations split into domain-specific modules.
//!
//! This module re-exports the main Database struct and all its operations.

mod helpers;
mod kv;

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::migrations;
use crate::models::KvEntry;

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Errors
    ///
    /// Returns an error if database directory creation, connection opening, or schema initialization fails
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = db_path.unwrap_or_else(Self::default_db_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(&path).context("Failed to open database connection")?;
        migrations::init_schema(&conn)?;

        log::info!("Database initialized at: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a database that lives only as long as this value
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the schema cannot be created
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        migrations::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get default database path
    #[must_use]
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("moodreel");
        path.push("moodreel.db");
        path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    // ==================== Key-Value Methods ====================

    /// Get the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        kv::get_value(&conn, key)
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert operation fails
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        kv::set_value(&conn, key, value)
    }

    /// Delete `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete operation fails
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        kv::delete_value(&conn, key)
    }

    /// List every stored entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a timestamp is corrupted
    pub fn list_entries(&self) -> Result<Vec<KvEntry>> {
        let conn = self.conn()?;
        kv::list_entries(&conn)
    }
}
