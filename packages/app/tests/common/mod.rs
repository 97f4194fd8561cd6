#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use wordcard::storage::{DatabaseManager, WordRepository, DEFAULT_CATEGORY_ID};
use wordcard::{Settings, Word};

pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

pub fn memory_db() -> Arc<DatabaseManager> {
    Arc::new(DatabaseManager::in_memory().expect("in-memory database"))
}

/// Insert a word with explicit counters and a creation time `minute` minutes
/// after a fixed base, so age ordering is deterministic.
pub fn insert_word(
    db: &DatabaseManager,
    id: &str,
    category_id: &str,
    wrong_count: u32,
    minute: i64,
) -> Word {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let word = Word {
        id: id.to_string(),
        source_text: format!("source-{id}"),
        phonetic: None,
        translation: format!("translation-{id}"),
        category_id: category_id.to_string(),
        wrong_count,
        correct_streak: 0,
        created_at: base + Duration::minutes(minute),
    };
    db.transaction(|conn| WordRepository::insert_word_internal(conn, &word))
        .expect("insert word");
    word
}

pub fn insert_default_words(
    db: &DatabaseManager,
    prefix: &str,
    count: usize,
    first_minute: i64,
) -> Vec<Word> {
    (0..count)
        .map(|i| {
            insert_word(
                db,
                &format!("{prefix}{i}"),
                DEFAULT_CATEGORY_ID,
                0,
                first_minute + i as i64,
            )
        })
        .collect()
}

pub fn set_settings(db: &DatabaseManager, daily_goal: u32, graduation_streak: u32) {
    db.settings()
        .save_settings(Settings {
            daily_goal,
            graduation_streak,
        })
        .expect("save settings");
}
