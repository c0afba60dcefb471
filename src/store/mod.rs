use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub mod models;
use models::*;

use crate::bridge::{GridData, GridKey, Level, Precomputed};
use crate::score::Player;

/// Precomputed grids in SQLite (single connection behind a mutex)
#[derive(Clone)]
pub struct GridStore {
    conn: Arc<Mutex<Connection>>,
}

impl GridStore {
    /// Open (or create) the grid database at the given path; `:memory:` works too
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = GridStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("grid store connection lock poisoned"))
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Insert or replace one grid
    pub fn save_grid(&self, key: &GridKey, data: &GridData) -> Result<()> {
        let conn = self.conn()?;
        upsert(&conn, key, data)?;
        Ok(())
    }

    /// Insert or replace a batch of grids in one transaction
    pub fn save_all(&self, grids: &[Precomputed]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for grid in grids {
            upsert(&tx, &grid.key, &grid.data)?;
        }
        tx.commit()?;
        debug!(grids = grids.len(), "grids saved");
        Ok(grids.len())
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Load a grid by its storage name
    pub fn load_grid(&self, name: &str) -> Result<Option<StoredGrid>> {
        let conn = self.conn()?;
        let grid = conn
            .query_row(
                "SELECT level, format, score, server, payload, created_at
                 FROM grids WHERE name = ?1",
                params![name],
                map_stored_grid,
            )
            .optional()?;
        Ok(grid)
    }

    /// Storage names, optionally restricted to one level
    pub fn list_keys(&self, level: Option<Level>) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM grids
             WHERE ?1 IS NULL OR level = ?1
             ORDER BY name",
        )?;
        let names = stmt
            .query_map(params![level.map(Level::as_str)], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Listing with sizes and timestamps, newest first
    pub fn list_summaries(&self, limit: i64) -> Result<Vec<GridSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, level, cells, created_at
             FROM grids ORDER BY created_at DESC, name LIMIT ?1",
        )?;
        let summaries = stmt
            .query_map(params![limit], map_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM grids", [], |row| row.get(0))?;
        Ok(n)
    }
}

fn upsert(conn: &Connection, key: &GridKey, data: &GridData) -> Result<()> {
    let payload = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO grids (name, level, format, score, server, cells, payload, created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
         ON CONFLICT(name) DO UPDATE SET
            cells=excluded.cells,
            payload=excluded.payload,
            created_at=excluded.created_at",
        params![
            key.name(),
            key.level.as_str(),
            key.format,
            key.score,
            key.server.number(),
            data.cells() as i64,
            payload,
            Utc::now(),
        ],
    )?;
    Ok(())
}

// ── Row mappers ───────────────────────────────────────────────────────────────

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn map_level(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Level> {
    let level: String = row.get(idx)?;
    level.parse().map_err(|e| conversion_error(idx, e))
}

fn map_stored_grid(row: &rusqlite::Row) -> rusqlite::Result<StoredGrid> {
    let server: u8 = row.get(3)?;
    let payload: String = row.get(4)?;
    Ok(StoredGrid {
        key: GridKey {
            level: map_level(row, 0)?,
            format: row.get(1)?,
            score: row.get(2)?,
            server: Player::try_from(server).map_err(|e| conversion_error(3, e))?,
        },
        data: serde_json::from_str(&payload).map_err(|e| conversion_error(4, e))?,
        created_at: row.get(5)?,
    })
}

fn map_summary(row: &rusqlite::Row) -> rusqlite::Result<GridSummary> {
    Ok(GridSummary {
        name: row.get(0)?,
        level: map_level(row, 1)?,
        cells: row.get(2)?,
        created_at: row.get(3)?,
    })
}

// ── Schema ────────────────────────────────────────────────────────────────────

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS grids (
    name        TEXT    PRIMARY KEY,
    level       TEXT    NOT NULL,
    format      TEXT    NOT NULL,
    score       TEXT    NOT NULL,
    server      INTEGER NOT NULL,
    cells       INTEGER NOT NULL,
    payload     TEXT    NOT NULL,
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_grids_level ON grids(level);
CREATE INDEX IF NOT EXISTS idx_grids_format ON grids(format);
"#;
