//! Row mapping and input models
//!
//! The domain types ([`Word`], [`Category`]) live in `wordcard-algo`; this
//! module maps them to and from SQLite rows and defines the write-side inputs.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};

use wordcard_algo::{Category, Word};

/// Id of the category created with the schema
pub const DEFAULT_CATEGORY_ID: &str = "default";

/// Display name of the default category
pub const DEFAULT_CATEGORY_NAME: &str = "Default";

// ============================================================
// Inputs
// ============================================================

/// Fields for registering a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub source_text: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    pub translation: String,
    pub category_id: String,
}

impl NewWord {
    pub fn new(
        source_text: impl Into<String>,
        translation: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            phonetic: None,
            translation: translation.into(),
            category_id: category_id.into(),
        }
    }

    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = Some(phonetic.into());
        self
    }
}

/// Editable word fields; counters are never touched by an edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEdit {
    pub source_text: Option<String>,
    /// `Some(None)` clears the annotation
    pub phonetic: Option<Option<String>>,
    pub translation: Option<String>,
    pub category_id: Option<String>,
}

// ============================================================
// StudyLogEntry
// ============================================================

/// Study log row for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogEntry {
    pub date: NaiveDate,
    /// Words studied that day across all sessions
    pub count: u32,
    /// Scope of the first session of the day
    pub category_id: String,
}

impl StudyLogEntry {
    pub fn from_row(row: &Row) -> SqliteResult<Self> {
        Ok(Self {
            date: parse_date(&row.get::<_, String>("date")?),
            count: row.get("count")?,
            category_id: row.get("category_id")?,
        })
    }
}

// ============================================================
// Row mapping
// ============================================================

pub const WORD_COLUMNS: &str = "id, source_text, phonetic, translation, category_id, \
     wrong_count, correct_streak, created_at";

pub const CATEGORY_COLUMNS: &str = "id, name, is_default, created_at";

pub fn word_from_row(row: &Row) -> SqliteResult<Word> {
    Ok(Word {
        id: row.get("id")?,
        source_text: row.get("source_text")?,
        phonetic: row.get("phonetic")?,
        translation: row.get("translation")?,
        category_id: row.get("category_id")?,
        wrong_count: row.get("wrong_count")?,
        correct_streak: row.get("correct_streak")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

pub fn category_from_row(row: &Row) -> SqliteResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        is_default: row.get::<_, i32>("is_default")? != 0,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

// ============================================================
// Time helpers
// ============================================================

/// Parse a stored timestamp
///
/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS`; anything else maps to the
/// Unix epoch so the row sorts first instead of failing the whole query.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return DateTime::from_naive_utc_and_offset(dt, Utc);
    }

    tracing::warn!(value = s, "unparseable timestamp in database");
    DateTime::<Utc>::default()
}

/// Fixed-width RFC 3339 with microseconds; sorts lexicographically
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| {
        tracing::warn!(value = s, "unparseable date in database");
        NaiveDate::default()
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
