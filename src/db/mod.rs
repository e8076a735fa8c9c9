mod record;
mod schema;

use anyhow::{anyhow, Context, Result};
use rusqlite::{Connection, ErrorCode, OpenFlags, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub use record::MediaRecord;
pub use schema::SCHEMA;

use record::{from_row, SELECT_COLUMNS};

fn is_locked(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}

fn lock_error(err: rusqlite::Error) -> anyhow::Error {
    if is_locked(&err) {
        anyhow!("another sync run holds the database lock")
    } else {
        err.into()
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Ok(Self { conn })
    }

    /// Open an existing database without creating or changing anything.
    /// Returns `None` when there is no file at `path`.
    pub fn open_read_only(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Ok(Some(Self { conn }))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// How long to wait for another connection's lock before giving up.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA).map_err(lock_error)?;
        Ok(())
    }

    /// Start a sync run. The returned transaction holds an exclusive lock on
    /// the database file until it is committed or dropped, so a second run
    /// against the same file fails instead of interleaving.
    pub fn begin_sync(&mut self) -> Result<SyncTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)
            .map_err(lock_error)?;
        Ok(SyncTransaction { tx })
    }

    /// Whether the `media` table has been created yet.
    pub fn has_media_table(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'media'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All records, ordered by normalized title.
    pub fn records(&self) -> Result<Vec<MediaRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM media ORDER BY titlenormalized, filename",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map([], from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn get_record(&self, filename: &str) -> Result<Option<MediaRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM media WHERE filename = ?", SELECT_COLUMNS),
            [filename],
            from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn count_records(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Writes for one sync run. Nothing is visible to other connections until
/// [`SyncTransaction::commit`]; dropping it rolls the whole run back.
pub struct SyncTransaction<'a> {
    tx: Transaction<'a>,
}

impl SyncTransaction<'_> {
    /// Every filename already recorded.
    pub fn known_filenames(&self) -> Result<HashSet<String>> {
        let mut stmt = self
            .tx
            .prepare("SELECT filename FROM media WHERE filename IS NOT NULL")?;
        let filenames = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(filenames)
    }

    pub fn insert(&self, record: &MediaRecord) -> Result<()> {
        let meta = &record.metadata;

        // Columns are named so the statement survives new columns being added
        self.tx.execute(
            r#"
            INSERT INTO media (
                filename, filenameyear, imdbid, title, titlenormalized,
                year, runtime, genre, director, actors,
                shortplot, fullplot, poster, metascore, imdbrating,
                type, dateadded
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                record.filename,
                record.filename_year,
                meta.imdb_id,
                record.title,
                record.title_normalized,
                meta.year,
                meta.runtime,
                meta.genre,
                meta.director,
                meta.actors,
                meta.short_plot,
                meta.full_plot,
                meta.poster,
                meta.metascore,
                meta.imdb_rating,
                meta.kind,
                record.date_added,
            ],
        )?;

        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().context("Failed to commit sync run")?;
        Ok(())
    }
}
