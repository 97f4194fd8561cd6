//! Settings repository
//!
//! Study settings are kept as key/value rows so new keys need no migration.
//! Missing or malformed values fall back to the defaults.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use wordcard_algo::sanitize::{sanitize_daily_goal, sanitize_graduation_streak, sanitize_settings};
use wordcard_algo::Settings;

use crate::storage::models::format_datetime;
use crate::storage::{lock_connection, StorageResult};

const KEY_DAILY_GOAL: &str = "daily_goal";
const KEY_GRADUATION_STREAK: &str = "graduation_streak";

pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.conn)
    }

    /// Stored settings, clamped into their valid ranges
    pub fn get_settings(&self) -> StorageResult<Settings> {
        let conn = self.get_conn()?;
        Self::get_settings_internal(&conn)
    }

    /// Persist settings after clamping; returns what was stored
    pub fn save_settings(&self, settings: Settings) -> StorageResult<Settings> {
        let conn = self.get_conn()?;
        Self::save_settings_internal(&conn, settings)
    }

    pub fn get_settings_internal(conn: &Connection) -> StorageResult<Settings> {
        let defaults = Settings::default();
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut settings = defaults;
        for (key, value) in rows {
            let parsed = value.trim().parse::<i64>();
            match (key.as_str(), parsed) {
                (KEY_DAILY_GOAL, Ok(v)) => settings.daily_goal = sanitize_daily_goal(v),
                (KEY_GRADUATION_STREAK, Ok(v)) => {
                    settings.graduation_streak = sanitize_graduation_streak(v)
                }
                (KEY_DAILY_GOAL | KEY_GRADUATION_STREAK, Err(_)) => {
                    tracing::warn!(key = %key, value = %value, "ignoring malformed setting");
                }
                _ => {}
            }
        }

        Ok(settings)
    }

    pub fn save_settings_internal(
        conn: &Connection,
        settings: Settings,
    ) -> StorageResult<Settings> {
        let settings = sanitize_settings(settings);
        let now = format_datetime(Utc::now());

        for (key, value) in [
            (KEY_DAILY_GOAL, settings.daily_goal),
            (KEY_GRADUATION_STREAK, settings.graduation_streak),
        ] {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value.to_string(), now],
            )?;
        }

        tracing::debug!(
            daily_goal = settings.daily_goal,
            graduation_streak = settings.graduation_streak,
            "settings saved"
        );
        Ok(settings)
    }
}
