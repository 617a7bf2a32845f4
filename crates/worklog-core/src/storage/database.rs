//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Each day's session list, stored as JSON under its day key
//! - Key-value store for application state

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::{DatabaseError, Result};
use crate::session::Session;

use super::data_dir;
use super::migrations;
use super::store::SessionStore;

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/worklog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("worklog.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        log::debug!("opened session database at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(DatabaseError::from)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SessionStore for Database {
    fn save(&self, day_key: &str, sessions: &[Session]) -> Result<()> {
        let json = serde_json::to_string(sessions)?;
        self.conn
            .execute(
                "INSERT INTO days (day_key, sessions, updated_at, session_count)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(day_key) DO UPDATE SET
                    sessions = excluded.sessions,
                    updated_at = excluded.updated_at,
                    session_count = excluded.session_count",
                params![day_key, json, Utc::now().to_rfc3339(), sessions.len() as i64],
            )
            .map_err(DatabaseError::from)?;
        log::debug!("saved {} session(s) for {day_key}", sessions.len());
        Ok(())
    }

    fn load(&self, day_key: &str) -> Result<Option<Vec<Session>>> {
        let result = self.conn.query_row(
            "SELECT sessions FROM days WHERE day_key = ?1",
            params![day_key],
            |row| row.get::<_, String>(0),
        );
        let json = match result {
            Ok(json) => json,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(DatabaseError::from(e).into()),
        };
        let sessions = serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptData {
            day_key: day_key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(sessions))
    }

    fn days(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT day_key FROM days WHERE session_count > 0 ORDER BY day_key")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(DatabaseError::from)?;
        let mut days = Vec::new();
        for row in rows {
            days.push(row.map_err(DatabaseError::from)?);
        }
        Ok(days)
    }
}
