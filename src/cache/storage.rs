//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::traits::{CacheEntry, CacheKey};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Read the entry stored under a key.
  fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

  /// Replace the entry stored under a key.
  fn write(&self, key: &CacheKey, payload: &serde_json::Value) -> Result<()>;
}

impl<S: CacheStorage + ?Sized> CacheStorage for Box<S> {
  fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
    (**self).read(key)
  }

  fn write(&self, key: &CacheKey, payload: &serde_json::Value) -> Result<()> {
    (**self).write(key, payload)
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn read(&self, _key: &CacheKey) -> Result<Option<CacheEntry>> {
    Ok(None) // Always miss
  }

  fn write(&self, _key: &CacheKey, _payload: &serde_json::Value) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Cache that lives only as long as the process.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }

  /// Number of stored entries.
  pub fn len(&self) -> Result<usize> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count cache entries: {}", e))?;

    Ok(count as usize)
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- One row per (resource, subject[, qualifier]); overwritten on every successful fetch
CREATE TABLE IF NOT EXISTS cache_entries (
    key_hash TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    resource TEXT NOT NULL,
    subject TEXT NOT NULL,
    payload TEXT NOT NULL,
    written_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_subject
    ON cache_entries(subject, resource);
"#;

impl CacheStorage for SqliteStorage {
  fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT payload, written_at FROM cache_entries WHERE key_hash = ?",
        params![key.storage_hash()],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry {}: {}", key, e))?;

    match row {
      Some((payload, written_at)) => {
        let payload = serde_json::from_str(&payload)
          .map_err(|e| eyre!("Failed to deserialize cache entry {}: {}", key, e))?;
        let written_at = parse_datetime(&written_at)?;
        Ok(Some(CacheEntry {
          payload,
          written_at,
        }))
      }
      None => Ok(None),
    }
  }

  fn write(&self, key: &CacheKey, payload: &serde_json::Value) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data =
      serde_json::to_string(payload).map_err(|e| eyre!("Failed to serialize payload: {}", e))?;
    let written_at = Utc::now().format(DATETIME_FORMAT).to_string();

    conn
      .execute(
        "INSERT OR REPLACE INTO cache_entries (key_hash, description, resource, subject, payload, written_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
          key.storage_hash(),
          key.description(),
          key.resource(),
          key.subject(),
          data,
          written_at
        ],
      )
      .map_err(|e| eyre!("Failed to store cache entry {}: {}", key, e))?;

    Ok(())
  }
}

/// Parse a datetime string in the stored "YYYY-MM-DD HH:MM:SS" form.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
