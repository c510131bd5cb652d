//! SQLite-backed root store.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow readers while a writer commits
//! - `busy_timeout = 5s` to reduce transient lock failures
//! - the whole root is written inside one transaction per commit
//!
//! Records are stored as JSON rows: a single `meta` row (next-id counter,
//! settings, view state) plus one `trackers` row per tracker.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::debug;

use super::{Root, Store, ViewState};
use crate::error::CoreError;
use crate::model::TrackerRecord;

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_VERSION: i64 = 1;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, apply runtime pragmas, and
    /// migrate the schema to the latest version.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("open store database {}", path.display()))?;
        configure_connection(&conn).context("configure sqlite pragmas")?;
        migrate(&conn).context("apply store migrations")?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self { conn })
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("query schema version")?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    let default_root = Root::default();
    let settings = serde_json::to_string(&default_root.settings)?;
    let view = serde_json::to_string(&default_root.view)?;
    conn.execute_batch(&format!(
        "BEGIN;
         CREATE TABLE IF NOT EXISTS meta (
             id       INTEGER PRIMARY KEY CHECK (id = 1),
             next_id  INTEGER NOT NULL,
             settings TEXT NOT NULL,
             view     TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS trackers (
             id     INTEGER PRIMARY KEY,
             record TEXT NOT NULL
         );
         INSERT OR IGNORE INTO meta (id, next_id, settings, view)
             VALUES (1, 1, '{settings}', '{view}');
         PRAGMA user_version = {SCHEMA_VERSION};
         COMMIT;"
    ))
    .context("create store schema")?;
    Ok(())
}

impl Store for SqliteStore {
    fn load(&mut self) -> Result<Root, CoreError> {
        let (next_id, settings_json, view_json): (i64, String, String) = self
            .conn
            .query_row(
                "SELECT next_id, settings, view FROM meta WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("read meta row")?;

        let settings =
            serde_json::from_str(&settings_json).context("decode settings record")?;
        let view: ViewState =
            serde_json::from_str(&view_json).context("decode view record")?;

        let mut stmt = self
            .conn
            .prepare("SELECT record FROM trackers ORDER BY id")
            .context("prepare tracker query")?;
        let trackers = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query tracker rows")?
            .map(|row| {
                let json = row.context("read tracker row")?;
                serde_json::from_str::<TrackerRecord>(&json).context("decode tracker record")
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Root {
            settings,
            trackers,
            next_id: u64::try_from(next_id).context("next_id out of range")?,
            view,
        })
    }

    fn commit(&mut self, root: &Root) -> Result<(), CoreError> {
        let tx = self.conn.transaction().context("begin commit")?;
        tx.execute("DELETE FROM trackers", [])
            .context("clear tracker rows")?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO trackers (id, record) VALUES (?1, ?2)")
                .context("prepare tracker insert")?;
            for record in &root.trackers {
                let id = i64::try_from(record.id.0).context("tracker id out of range")?;
                let json = serde_json::to_string(record).context("encode tracker record")?;
                stmt.execute(params![id, json]).context("insert tracker")?;
            }
        }
        tx.execute(
            "UPDATE meta SET next_id = ?1, settings = ?2, view = ?3 WHERE id = 1",
            params![
                i64::try_from(root.next_id).context("next_id out of range")?,
                serde_json::to_string(&root.settings).context("encode settings")?,
                serde_json::to_string(&root.view).context("encode view state")?,
            ],
        )
        .context("update meta row")?;
        tx.commit().context("commit root")?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.conn
            .close()
            .map_err(|(_, err)| anyhow::Error::from(err).context("close store"))?;
        Ok(())
    }
}
