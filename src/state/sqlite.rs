//! SQLite-backed state store
//!
//! One row per scraper identity; the visited set and pending queue are
//! stored as JSON text columns. The schema is created on open, so pointing
//! the store at a fresh path just works.

use crate::state::store::{PersistedCrawlState, StateError, StateStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS crawl_state (
    identity   TEXT PRIMARY KEY,
    visited    TEXT NOT NULL,
    pending    TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

/// Persists crawl state in a SQLite database file
pub struct SqliteStateStore {
    conn: Connection,
}

impl SqliteStateStore {
    /// Opens (and if necessary creates) the state database at `path`
    pub fn open(path: &Path) -> Result<Self, StateError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory state database
    pub fn in_memory() -> Result<Self, StateError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Drops all persisted state (the `--fresh` path)
    pub fn clear_all(&mut self) -> Result<(), StateError> {
        self.conn.execute("DELETE FROM crawl_state", [])?;
        tracing::info!("Cleared all persisted crawl state");
        Ok(())
    }
}

impl StateStore for SqliteStateStore {
    fn load(&mut self, identity: &str) -> Result<Option<PersistedCrawlState>, StateError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT visited, pending FROM crawl_state WHERE identity = ?1",
                [identity],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((visited, pending)) = row else {
            return Ok(None);
        };

        Ok(Some(PersistedCrawlState {
            visited: serde_json::from_str(&visited)?,
            pending: serde_json::from_str(&pending)?,
        }))
    }

    fn save(&mut self, identity: &str, state: &PersistedCrawlState) -> Result<(), StateError> {
        let visited = serde_json::to_string(&state.visited)?;
        let pending = serde_json::to_string(&state.pending)?;

        self.conn.execute(
            "INSERT INTO crawl_state (identity, visited, pending, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(identity) DO UPDATE SET
                 visited = excluded.visited,
                 pending = excluded.pending,
                 updated_at = excluded.updated_at",
            params![identity, visited, pending],
        )?;

        tracing::debug!(
            "Saved crawl state for {} ({} visited, {} pending)",
            identity,
            state.visited.len(),
            state.pending.len()
        );
        Ok(())
    }

    fn clear(&mut self, identity: &str) -> Result<(), StateError> {
        self.conn
            .execute("DELETE FROM crawl_state WHERE identity = ?1", [identity])?;
        Ok(())
    }
}
