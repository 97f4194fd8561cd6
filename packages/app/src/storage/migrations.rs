//! Schema migrations
//!
//! Keeps the SQLite schema in step with the application version.
//!
//! - every migration runs in its own transaction
//! - applied versions are recorded in `schema_migrations`

use rusqlite::Connection;

use crate::storage::{StorageError, StorageResult};

/// Latest schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Initial schema (V1)
const INIT_SCHEMA: &str = include_str!("schema.sql");

/// Migration definition
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// All migrations, ordered by version
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "initial schema", INIT_SCHEMA),
        Migration::new(
            2,
            "selection indexes",
            r#"
            -- per-category listing in registration order
            CREATE INDEX IF NOT EXISTS idx_word_category_created
                ON word(category_id, created_at);

            -- wrong pool lookups
            CREATE INDEX IF NOT EXISTS idx_word_wrong_count
                ON word(wrong_count);
            "#,
        ),
    ]
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Highest applied version, 0 for a fresh database
pub fn get_current_version(conn: &Connection) -> i32 {
    if ensure_migrations_table(conn).is_err() {
        return 0;
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

fn get_applied_versions(conn: &Connection) -> StorageResult<Vec<i32>> {
    ensure_migrations_table(conn)?;

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;

    Ok(versions)
}

fn record_migration(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.name,
            chrono::Utc::now().timestamp()
        ],
    )?;
    Ok(())
}

/// Apply every migration that has not run yet
///
/// Returns the resulting schema version.
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;

    let applied_versions = get_applied_versions(conn)?;
    let mut final_version = get_current_version(conn);

    if final_version < CURRENT_SCHEMA_VERSION {
        tracing::info!(
            current = final_version,
            target = CURRENT_SCHEMA_VERSION,
            "migrating database schema"
        );
    }

    for migration in get_migrations() {
        if applied_versions.contains(&migration.version) {
            continue;
        }

        tracing::info!(version = migration.version, name = %migration.name, "running migration");

        match execute_migration_in_transaction(conn, &migration) {
            Ok(()) => final_version = migration.version,
            Err(e) => {
                tracing::error!(version = migration.version, error = %e, "migration failed");
                return Err(e);
            }
        }
    }

    Ok(final_version)
}

fn execute_migration_in_transaction(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE")?;

    let applied = conn
        .execute_batch(&migration.sql)
        .map_err(|e| {
            StorageError::Migration(format!("v{} failed: {}", migration.version, e))
        })
        .and_then(|_| record_migration(conn, migration));

    match applied {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK").ok();
            Err(e)
        }
    }
}
