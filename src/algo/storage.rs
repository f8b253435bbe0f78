//! SQLite-backed store for the most recent result set.
//!
//! The store holds at most one row: saving replaces whatever was there. The
//! records are kept as a JSON blob next to their [`StoredMeta`]. The storage
//! layer is opt-in via the `cache` feature.

use rusqlite::{params, Connection, OptionalExtension};

use super::cache::StoredMeta;
use super::model::ClassifiedKeyword;
use crate::error::{Result, SiteplanError};

fn storage_err(context: &str) -> impl FnOnce(rusqlite::Error) -> SiteplanError + '_ {
    move |e| SiteplanError::Storage(format!("{context}: {e}"))
}

/// SQLite-backed store for one result set.
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open (or create) a store at the given path. `:memory:` works for tests.
    pub fn open_or_create(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| SiteplanError::Storage(format!("failed to open store at '{path}': {e}")))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(storage_err("failed to set PRAGMA"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS result_set (
                id             INTEGER PRIMARY KEY CHECK (id = 1),
                input_hash     INTEGER NOT NULL,
                keyword_count  INTEGER NOT NULL,
                record_count   INTEGER NOT NULL,
                version        TEXT NOT NULL,
                created_at     INTEGER NOT NULL,
                payload        BLOB NOT NULL
            );",
        )
        .map_err(storage_err("failed to create schema"))?;

        Ok(Self { conn })
    }

    /// Replace the stored result set.
    pub fn save(&mut self, meta: &StoredMeta, records: &[ClassifiedKeyword]) -> Result<()> {
        let payload = serde_json::to_vec(records)?;
        let tx = self
            .conn
            .transaction()
            .map_err(storage_err("failed to begin transaction"))?;
        tx.execute("DELETE FROM result_set", [])
            .map_err(storage_err("failed to clear previous results"))?;
        tx.execute(
            "INSERT INTO result_set (id, input_hash, keyword_count, record_count, version, created_at, payload)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                meta.input_hash as i64,
                meta.keyword_count as i64,
                meta.record_count as i64,
                meta.version,
                meta.created_at as i64,
                payload,
            ],
        )
        .map_err(storage_err("failed to store results"))?;
        tx.commit().map_err(storage_err("failed to commit results"))?;
        tracing::debug!(records = records.len(), "result set stored");
        Ok(())
    }

    /// The stored result set, or `None` when the store is empty.
    pub fn load(&self) -> Result<Option<(StoredMeta, Vec<ClassifiedKeyword>)>> {
        let row = self
            .conn
            .query_row(
                "SELECT input_hash, keyword_count, record_count, version, created_at, payload
                 FROM result_set WHERE id = 1",
                [],
                |row| {
                    let meta = read_meta(row)?;
                    let payload: Vec<u8> = row.get(5)?;
                    Ok((meta, payload))
                },
            )
            .optional()
            .map_err(storage_err("failed to query results"))?;

        match row {
            Some((meta, payload)) => {
                let records: Vec<ClassifiedKeyword> = serde_json::from_slice(&payload)?;
                Ok(Some((meta, records)))
            }
            None => Ok(None),
        }
    }

    /// Metadata of the stored result set without decoding the records.
    pub fn info(&self) -> Result<Option<StoredMeta>> {
        self.conn
            .query_row(
                "SELECT input_hash, keyword_count, record_count, version, created_at
                 FROM result_set WHERE id = 1",
                [],
                read_meta,
            )
            .optional()
            .map_err(storage_err("failed to query result info"))
    }

    /// Delete the stored result set. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM result_set", [])
            .map_err(storage_err("failed to clear results"))?;
        Ok(deleted > 0)
    }
}

fn read_meta(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMeta> {
    Ok(StoredMeta {
        input_hash: row.get::<_, i64>(0)? as u64,
        keyword_count: row.get::<_, i64>(1)? as usize,
        record_count: row.get::<_, i64>(2)? as usize,
        version: row.get(3)?,
        created_at: row.get::<_, i64>(4)? as u64,
    })
}
