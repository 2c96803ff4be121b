// SQLite persistence layer for draft picks and draft state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use gridiron_core::Pick;

/// SQLite-backed persistence for draft picks and key-value draft state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_picks (
                draft_id    TEXT NOT NULL,
                seq         INTEGER NOT NULL,
                player_id   INTEGER NOT NULL,
                team_index  INTEGER NOT NULL,
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (draft_id, seq),
                UNIQUE (draft_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS draft_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. A poisoned mutex is reported as an
    /// error rather than a panic.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Record the pick at 1-indexed position `seq` of draft `draft_id`.
    /// A second pick at the same position, or a second pick of the same
    /// player within one draft, is an error.
    pub fn record_pick(&self, draft_id: &str, seq: usize, pick: &Pick) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO draft_picks (draft_id, seq, player_id, team_index)
             VALUES (?1, ?2, ?3, ?4)",
            params![draft_id, seq as i64, pick.player_id as i64, pick.team_index],
        )
        .with_context(|| format!("failed to record pick {seq} for draft {draft_id}"))?;
        Ok(())
    }

    /// Delete the most recent pick of `draft_id`. Returns whether a pick was
    /// removed.
    pub fn remove_last_pick(&self, draft_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM draft_picks
                 WHERE draft_id = ?1
                   AND seq = (SELECT MAX(seq) FROM draft_picks WHERE draft_id = ?1)",
                params![draft_id],
            )
            .context("failed to remove last draft pick")?;
        Ok(removed > 0)
    }

    /// Load the picks of `draft_id` in draft order.
    pub fn load_picks(&self, draft_id: &str) -> Result<Vec<Pick>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT player_id, team_index FROM draft_picks
                 WHERE draft_id = ?1 ORDER BY seq",
            )
            .context("failed to prepare load_picks query")?;

        let picks = stmt
            .query_map(params![draft_id], |row| {
                let player_id: i64 = row.get(0)?;
                Ok(Pick {
                    player_id: player_id as u64,
                    team_index: row.get(1)?,
                })
            })
            .context("failed to query draft picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft pick rows")?;

        Ok(picks)
    }

    /// Returns `true` if at least one pick has been recorded for `draft_id`.
    pub fn has_draft_in_progress(&self, draft_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM draft_picks WHERE draft_id = ?1)",
                params![draft_id],
                |row| row.get(0),
            )
            .context("failed to check draft_picks existence")?;
        Ok(exists)
    }

    /// Return the number of picks recorded for `draft_id`.
    pub fn pick_count(&self, draft_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM draft_picks WHERE draft_id = ?1",
                params![draft_id],
                |row| row.get(0),
            )
            .context("failed to count draft picks")?;
        Ok(count as usize)
    }

    /// Delete every pick of `draft_id`. Other drafts and the key-value state
    /// are untouched.
    pub fn clear_draft(&self, draft_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM draft_picks WHERE draft_id = ?1",
            params![draft_id],
        )
        .context("failed to delete draft picks")?;
        tx.commit().context("failed to commit clear_draft")?;
        Ok(())
    }

    /// Persist an arbitrary JSON value under `key`, replacing any previous
    /// value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn()?;
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO draft_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value FROM draft_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query draft state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Draft ID management
    // ------------------------------------------------------------------

    /// Key used in the draft_state table to store the current draft ID.
    const DRAFT_ID_KEY: &'static str = "current_draft_id";

    /// The stored draft ID, if one has been set.
    pub fn get_draft_id(&self) -> Result<Option<String>> {
        let value = self.load_state(Self::DRAFT_ID_KEY)?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    pub fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        self.save_state(
            Self::DRAFT_ID_KEY,
            &serde_json::Value::String(draft_id.to_string()),
        )
    }

    /// Generate a new draft ID from the current UTC time.
    ///
    /// Format: `draft_YYYYMMDD_HHMMSS_SSS` (e.g. `draft_20260907_193015_042`).
    pub fn generate_draft_id() -> String {
        let now = chrono::Utc::now();
        now.format("draft_%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// The stored draft ID, or a freshly generated one that is stored
    /// before returning.
    pub fn current_or_new_draft_id(&self) -> Result<String> {
        if let Some(id) = self.get_draft_id()? {
            return Ok(id);
        }
        let id = Self::generate_draft_id();
        self.set_draft_id(&id)?;
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
