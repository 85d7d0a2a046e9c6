use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Transaction};
use serde_json::Value;

use super::schema;
use crate::errors::{MemoryError, Result};
use crate::report::ReportTable;

/// How long a writer waits on a locked store before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// A row read generically: column name to value, in column order.
pub type Row = serde_json::Map<String, Value>;

/// Handle to a memory bank store file.
///
/// Holds only the store path. Every operation acquires its own connection
/// through [`MemoryBank::with_transaction`], so handles are cheap to clone and
/// nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct MemoryBank {
    path: PathBuf,
}

impl MemoryBank {
    /// Create a handle without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open an existing store and bring its schema up to date.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let bank = Self::new(path);
        if !bank.exists() {
            return Err(MemoryError::StoreNotFound { path: bank.path });
        }
        bank.migrate()?;
        Ok(bank)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Run `f` inside one connection-scoped transaction.
    ///
    /// Commits when `f` returns `Ok`. On `Err` the transaction is dropped,
    /// which rolls back every write made inside the scope, and the error is
    /// returned unchanged. The connection is closed on every exit path.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Create the store if needed and apply pending migrations.
    /// Returns the number of migrations applied.
    pub fn migrate(&self) -> Result<usize> {
        let mut conn = self.connect()?;
        let applied = schema::apply_migrations(&mut conn)?;
        if applied > 0 {
            tracing::info!(path = %self.path.display(), applied, "memory bank schema updated");
        }
        Ok(applied)
    }

    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.connect()?;
        schema::current_version(&conn)
    }

    /// Copy the whole store file to `destination`.
    ///
    /// Returns `false` without creating anything when the store does not
    /// exist, and `false` when the copy fails. No hot-backup consistency is
    /// provided: a concurrent writer may leave the copy mid-transaction.
    pub fn backup(&self, destination: &Path) -> bool {
        if !self.path.is_file() {
            tracing::warn!(path = %self.path.display(), "backup skipped: store does not exist");
            return false;
        }
        match std::fs::copy(&self.path, destination) {
            Ok(bytes) => {
                tracing::info!(
                    destination = %destination.display(),
                    bytes,
                    "memory bank backed up"
                );
                true
            }
            Err(e) => {
                tracing::warn!(destination = %destination.display(), error = %e, "backup failed");
                false
            }
        }
    }

    /// Delete the store file. Returns `false` when there was nothing to delete.
    pub fn remove(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "memory bank removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(MemoryError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read every row of a reportable table, columns in table order.
    pub fn read_table(&self, table: ReportTable) -> Result<Vec<Row>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(table.query())?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let mut rows = stmt.query([])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Row::new();
                for (idx, name) in columns.iter().enumerate() {
                    record.insert(name.clone(), json_value(row.get_ref(idx)?));
                }
                out.push(record);
            }
            Ok(out)
        })
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Helper for tests across the memory modules: a migrated store in a temp dir.
#[cfg(test)]
pub(crate) fn test_bank() -> (tempfile::TempDir, MemoryBank) {
    let dir = tempfile::TempDir::new().unwrap();
    let bank = MemoryBank::new(dir.path().join("memory_bank.db"));
    bank.migrate().unwrap();
    (dir, bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::models::NewStory;

    #[test]
    fn test_open_missing_store_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nope.db");
        let err = MemoryBank::open(&path).unwrap_err();
        assert!(matches!(err, MemoryError::StoreNotFound { .. }));
        assert!(!path.exists(), "open must not create the store");
    }

    #[test]
    fn test_migrate_creates_store_and_is_repeatable() {
        let dir = tempfile::TempDir::new().unwrap();
        let bank = MemoryBank::new(dir.path().join("bank.db"));
        assert!(!bank.exists());
        assert_eq!(bank.migrate().unwrap(), schema::MIGRATIONS.len());
        assert!(bank.exists());
        assert_eq!(bank.migrate().unwrap(), 0);
        assert_eq!(bank.schema_version().unwrap(), schema::latest_version());

        let reopened = MemoryBank::open(bank.path()).unwrap();
        assert_eq!(reopened.path(), bank.path());
    }

    #[test]
    fn test_connection_enforces_foreign_keys() {
        let (_dir, bank) = test_bank();
        let enabled: i64 = bank
            .with_transaction(|tx| Ok(tx.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_connection_sets_busy_timeout() {
        let (_dir, bank) = test_bank();
        let timeout_ms: i64 = bank
            .with_transaction(|tx| Ok(tx.query_row("PRAGMA busy_timeout", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(timeout_ms, 5000);
        assert_eq!(timeout_ms as u128, BUSY_TIMEOUT.as_millis());
    }

    #[test]
    fn test_writer_waits_for_held_lock() {
        let (_dir, bank) = test_bank();
        let holder = Connection::open(bank.path()).unwrap();
        holder
            .execute_batch("BEGIN IMMEDIATE; INSERT INTO stories (title) VALUES ('holder');")
            .unwrap();

        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(1000));
            holder.execute_batch("COMMIT").unwrap();
        });

        let started = std::time::Instant::now();
        let result = bank.create_story(NewStory::new("waiter"));
        let waited = started.elapsed();
        release.join().unwrap();

        assert!(result.is_ok(), "writer failed instead of waiting: {result:?}");
        assert!(waited >= Duration::from_millis(500), "waited only {waited:?}");
        assert_eq!(bank.list_stories().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_scope_rolls_back_all_writes() {
        let (_dir, bank) = test_bank();
        let result: Result<()> = bank.with_transaction(|tx| {
            tx.execute("INSERT INTO stories (title) VALUES ('first')", [])?;
            tx.execute("INSERT INTO stories (title) VALUES ('second')", [])?;
            Err(MemoryError::InvalidPriority(0))
        });
        assert!(matches!(result, Err(MemoryError::InvalidPriority(0))));
        assert!(bank.list_stories().unwrap().is_empty());
    }

    #[test]
    fn test_successful_scope_commits() {
        let (_dir, bank) = test_bank();
        bank.with_transaction(|tx| {
            tx.execute("INSERT INTO stories (title) VALUES ('kept')", [])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(bank.list_stories().unwrap().len(), 1);
    }

    #[test]
    fn test_backup_of_missing_store_fails_without_creating_destination() {
        let dir = tempfile::TempDir::new().unwrap();
        let bank = MemoryBank::new(dir.path().join("missing.db"));
        let dest = dir.path().join("backup.db");
        assert!(!bank.backup(&dest));
        assert!(!dest.exists());
    }

    #[test]
    fn test_backup_is_byte_identical() {
        let (dir, bank) = test_bank();
        bank.create_story(NewStory::new("Ship v1")).unwrap();
        let dest = dir.path().join("copy.db");
        assert!(bank.backup(&dest));
        assert_eq!(
            std::fs::read(bank.path()).unwrap(),
            std::fs::read(&dest).unwrap()
        );
    }

    #[test]
    fn test_backup_to_unwritable_destination_fails() {
        let (dir, bank) = test_bank();
        let dest = dir.path().join("no-such-dir").join("copy.db");
        assert!(!bank.backup(&dest));
    }

    #[test]
    fn test_remove_deletes_store_once() {
        let (_dir, bank) = test_bank();
        assert!(bank.remove().unwrap());
        assert!(!bank.exists());
        assert!(!bank.remove().unwrap());
    }

    #[test]
    fn test_remove_directory_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let bank = MemoryBank::new(dir.path());
        let err = bank.remove().unwrap_err();
        assert!(matches!(err, MemoryError::Io { .. }));
    }

    #[test]
    fn test_read_table_preserves_column_order() {
        let (_dir, bank) = test_bank();
        bank.create_story(NewStory::new("Ordered")).unwrap();
        let rows = bank.read_table(ReportTable::Stories).unwrap();
        assert_eq!(rows.len(), 1);
        let keys: Vec<&str> = rows[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(&keys[..3], &["id", "title", "description"]);
        assert_eq!(rows[0]["title"], "Ordered");
        assert_eq!(rows[0]["priority"], 3);
        assert!(rows[0]["description"].is_null());
    }
}
