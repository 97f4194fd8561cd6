//! Study log repository
//!
//! One row per calendar day. Appending to an existing day adds to its count
//! and keeps the scope recorded by the day's first session.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::models::{format_date, format_datetime, StudyLogEntry};
use crate::storage::{lock_connection, StorageResult};

pub struct StudyLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudyLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.conn)
    }

    /// Merge `count` into the entry for `date`
    pub fn append(
        &self,
        date: NaiveDate,
        count: u32,
        category_id: &str,
    ) -> StorageResult<StudyLogEntry> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO study_log (date, count, category_id, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(date) DO UPDATE SET
                count = count + excluded.count,
                updated_at = excluded.updated_at
            "#,
            params![format_date(date), count, category_id, format_datetime(Utc::now())],
        )?;

        let entry = Self::get_internal(&conn, date)?.unwrap_or(StudyLogEntry {
            date,
            count,
            category_id: category_id.to_string(),
        });
        tracing::debug!(date = %date, added = count, total = entry.count, "study log updated");
        Ok(entry)
    }

    pub fn get(&self, date: NaiveDate) -> StorageResult<Option<StudyLogEntry>> {
        let conn = self.get_conn()?;
        Self::get_internal(&conn, date)
    }

    /// Entries with `from <= date <= to`, oldest first (heatmap data)
    pub fn entries_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StorageResult<Vec<StudyLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT date, count, category_id FROM study_log \
             WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC",
        )?;
        let entries = stmt
            .query_map(params![format_date(from), format_date(to)], StudyLogEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn all_entries(&self) -> StorageResult<Vec<StudyLogEntry>> {
        let conn = self.get_conn()?;
        Self::all_entries_internal(&conn)
    }

    /// Consecutive studied days ending today
    ///
    /// A day without an entry yet does not break the streak until it is over,
    /// so the count starts from yesterday when today is still empty.
    pub fn current_streak(&self, today: NaiveDate) -> StorageResult<u32> {
        let conn = self.get_conn()?;
        let mut day = today;
        if !Self::studied_on(&conn, day)? {
            day -= Duration::days(1);
        }

        let mut streak = 0;
        while Self::studied_on(&conn, day)? {
            streak += 1;
            day -= Duration::days(1);
        }
        Ok(streak)
    }

    /// Sum of all logged counts
    pub fn total_studied(&self) -> StorageResult<u64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row("SELECT COALESCE(SUM(count), 0) FROM study_log", [], |row| {
            row.get(0)
        })?;
        Ok(total.max(0) as u64)
    }

    // ============================================================
    // Internal
    // ============================================================

    fn studied_on(conn: &Connection, date: NaiveDate) -> StorageResult<bool> {
        let studied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM study_log WHERE date = ?1 AND count > 0)",
            params![format_date(date)],
            |row| row.get(0),
        )?;
        Ok(studied)
    }

    pub fn get_internal(
        conn: &Connection,
        date: NaiveDate,
    ) -> StorageResult<Option<StudyLogEntry>> {
        let entry = conn
            .query_row(
                "SELECT date, count, category_id FROM study_log WHERE date = ?1",
                params![format_date(date)],
                StudyLogEntry::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn all_entries_internal(conn: &Connection) -> StorageResult<Vec<StudyLogEntry>> {
        let mut stmt =
            conn.prepare("SELECT date, count, category_id FROM study_log ORDER BY date ASC")?;
        let entries = stmt
            .query_map([], StudyLogEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Write an entry verbatim, replacing any row for that day (restore path)
    pub fn put_entry_internal(conn: &Connection, entry: &StudyLogEntry) -> StorageResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO study_log (date, count, category_id, updated_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                format_date(entry.date),
                entry.count,
                entry.category_id,
                format_datetime(Utc::now()),
            ],
        )?;
        Ok(())
    }
}
