//! SQLite local storage
//!
//! Durable home of everything the quiz reads and writes:
//! - words and categories
//! - study settings
//! - the per-day study log
//!
//! One connection is shared behind `Arc<Mutex<Connection>>`; each repository
//! holds a clone of the handle.

// ============================================================
// Submodules
// ============================================================

pub mod category;
pub mod migrations;
pub mod models;
pub mod settings;
pub mod study_log;
pub mod word;

// ============================================================
// Re-exports
// ============================================================

pub use category::CategoryRepository;
pub use migrations::run_migrations;
pub use models::{NewWord, StudyLogEntry, WordEdit, DEFAULT_CATEGORY_ID};
pub use settings::SettingsRepository;
pub use study_log::StudyLogRepository;
pub use word::WordRepository;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

// ============================================================
// Errors
// ============================================================

/// Storage layer error
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("lock poisoned: {0}")]
    LockError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub(crate) fn lock_connection(
    conn: &Arc<Mutex<Connection>>,
) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StorageError::LockError(e.to_string()))
}

// ============================================================
// DatabaseManager
// ============================================================

/// Owner of the SQLite connection
///
/// Also implements the quiz store traits (see [`crate::store`]), so a
/// `DatabaseManager` can be handed straight to a
/// [`SessionEngine`](crate::session::SessionEngine).
pub struct DatabaseManager {
    connection: Arc<Mutex<Connection>>,
    db_path: String,
}

impl DatabaseManager {
    /// Open (or create) a database file and run migrations
    ///
    /// Enables WAL journaling and foreign keys.
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let connection = Connection::open(&db_path)?;

        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;

        let manager = Self {
            connection: Arc::new(Mutex::new(connection)),
            db_path: path_str,
        };
        manager.initialize()?;

        tracing::debug!(path = %manager.db_path, "database opened");
        Ok(manager)
    }

    /// In-memory database (tests, throwaway sessions)
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys=ON;")?;

        let manager = Self {
            connection: Arc::new(Mutex::new(connection)),
            db_path: ":memory:".to_string(),
        };
        manager.initialize()?;

        Ok(manager)
    }

    /// Run pending migrations
    pub fn initialize(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        migrations::run_migrations(&conn)?;
        Ok(())
    }

    /// Shared connection handle
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.connection)
    }

    pub fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.connection)
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Run a closure inside a transaction, committing on `Ok`
    ///
    /// ```ignore
    /// db.transaction(|conn| {
    ///     conn.execute("DELETE FROM study_log", [])?;
    ///     Ok(())
    /// })?;
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    // ========== Repositories ==========

    pub fn words(&self) -> WordRepository {
        WordRepository::new(self.connection())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.connection())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.connection())
    }

    pub fn study_log(&self) -> StudyLogRepository {
        StudyLogRepository::new(self.connection())
    }
}
