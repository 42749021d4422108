//! Key-value storage substrates the expense collection is persisted in.
//!
//! Every backend exposes the same synchronous string store:
//! - `get(key)` returns the stored value or `None` when the key was never written
//! - `set(key, value)` replaces the value in full
//!
//! Backends:
//! - SQLite: one `kv` table (`key TEXT PRIMARY KEY, value TEXT`) in `expenses.db`
//! - File: one `<key>.json` file per key in the data directory
//! - Memory: process-local map, nothing survives exit

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

/// File name of the SQLite database inside the data directory
pub const SQLITE_FILE_NAME: &str = "expenses.db";

/// Synchronous string-keyed store with no transactional guarantees
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Which substrate to persist expenses in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// SQLite database file in the data directory
    Sqlite,
    /// Plain JSON file per key in the data directory
    File,
    /// In-memory only; discarded on exit
    Memory,
}

/// Open the configured substrate rooted at `data_dir`
pub fn open_store(kind: StorageKind, data_dir: &Path) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match kind {
        StorageKind::Sqlite => Box::new(SqliteStore::open(&data_dir.join(SQLITE_FILE_NAME))?),
        StorageKind::File => Box::new(FileStore::new(data_dir.to_path_buf())),
        StorageKind::Memory => Box::new(MemoryStore::default()),
    };
    debug!(?kind, data_dir = %data_dir.display(), "opened storage backend");
    Ok(store)
}

/// Helper to read a column that might be stored as TEXT or BLOB.
/// Values written by other SQLite tools may arrive as raw bytes.
fn get_string_or_blob(row: &Row, idx: usize) -> rusqlite::Result<String> {
    match row.get::<_, String>(idx) {
        Ok(s) => Ok(s),
        Err(_) => {
            let blob: Vec<u8> = row.get(idx)?;
            String::from_utf8(blob).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Blob,
                    Box::new(e),
                )
            })
        }
    }
}

/// SQLite-backed key-value store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {parent:?}"))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {path:?}"))?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("Failed to create kv table")?;
        Ok(SqliteStore { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                get_string_or_blob(row, 0)
            })
            .optional()
            .with_context(|| format!("Failed to read key {key:?}"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key {key:?}"))?;
        Ok(())
    }
}

/// Directory of `<key>.json` files
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        FileStore { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {:?}", self.dir))?;
        let path = self.path_for(key);
        // Write beside the target then rename so a crash never leaves half a blob
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).with_context(|| format!("Failed to write {tmp:?}"))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {path:?}"))?;
        Ok(())
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
