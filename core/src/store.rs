//! SQLite persistence for snapshots and the game event log.
//!
//! RULE: Only store.rs talks to the database. The engine never does I/O;
//! hosts decide when to save and load, and hand raw snapshot JSON across.

use crate::{
    error::{IdleError, IdleResult},
    event::GameEvent,
    types::{SaveId, Timestamp},
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SaveStore {
    conn: Connection,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> IdleResult<Self> {
        let conn = Connection::open(path)?;
        // In-memory databases report "memory" instead of switching.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> IdleResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> IdleResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_saves.sql"))?;
        Ok(())
    }

    // ── Snapshots ──────────────────────────────────────────────

    /// Insert or overwrite the snapshot of `save_id`.
    pub fn save_snapshot(&self, save_id: &str, snapshot_json: &str, saved_at: Timestamp) -> IdleResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (save_id, snapshot_json, created_at, saved_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(save_id) DO UPDATE
               SET snapshot_json = excluded.snapshot_json,
                   saved_at      = excluded.saved_at",
            params![save_id, snapshot_json, saved_at],
        )?;
        log::debug!("store: saved snapshot for {save_id} at {saved_at}");
        Ok(())
    }

    pub fn load_snapshot(&self, save_id: &str) -> IdleResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT snapshot_json FROM save_slot WHERE save_id = ?1",
                params![save_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }

    /// Remove a slot and its event log. Used on game reset.
    pub fn delete_save(&self, save_id: &str) -> IdleResult<()> {
        self.conn
            .execute("DELETE FROM save_slot WHERE save_id = ?1", params![save_id])?;
        self.conn
            .execute("DELETE FROM event_log WHERE save_id = ?1", params![save_id])?;
        log::info!("store: deleted save {save_id}");
        Ok(())
    }

    /// All slots, most recently saved first.
    pub fn list_saves(&self) -> IdleResult<Vec<(SaveId, Timestamp)>> {
        let mut stmt = self.conn.prepare(
            "SELECT save_id, saved_at FROM save_slot ORDER BY saved_at DESC, save_id ASC",
        )?;
        let saves = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saves)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, save_id: &str, at: Timestamp, event: &GameEvent) -> IdleResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (save_id, at, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![save_id, at, event.type_name(), serde_json::to_string(event)?],
        )?;
        Ok(())
    }

    pub fn event_count(&self, save_id: &str) -> IdleResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE save_id = ?1",
            params![save_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Events of a slot in insertion order.
    pub fn events(&self, save_id: &str) -> IdleResult<Vec<GameEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM event_log WHERE save_id = ?1 ORDER BY id ASC",
        )?;
        let payloads = stmt
            .query_map(params![save_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(IdleError::from))
            .collect()
    }
}
