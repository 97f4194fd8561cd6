//! JSON library snapshots
//!
//! A snapshot holds everything: categories, words with their counters,
//! settings and the study log. Importing one replaces the library in a single
//! transaction, so a bad file leaves the database untouched.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use wordcard_algo::{Category, Settings, Word};

use crate::backup::{BackupError, BackupResult, ImportReport};
use crate::storage::category::is_reserved_name;
use crate::storage::{
    CategoryRepository, DatabaseManager, SettingsRepository, StudyLogEntry, StudyLogRepository,
    WordRepository, DEFAULT_CATEGORY_ID,
};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    pub words: Vec<Word>,
    pub settings: Settings,
    #[serde(default)]
    pub study_log: Vec<StudyLogEntry>,
}

/// Read the whole library in one consistent view
pub fn export_snapshot(db: &DatabaseManager) -> BackupResult<LibrarySnapshot> {
    let snapshot = db.transaction(|conn| {
        Ok(LibrarySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            exported_at: Utc::now(),
            categories: CategoryRepository::list_categories_internal(conn)?,
            words: WordRepository::list_words_internal(conn)?,
            settings: SettingsRepository::get_settings_internal(conn)?,
            study_log: StudyLogRepository::all_entries_internal(conn)?,
        })
    })?;

    tracing::info!(
        categories = snapshot.categories.len(),
        words = snapshot.words.len(),
        study_log = snapshot.study_log.len(),
        "library exported"
    );
    Ok(snapshot)
}

/// Check a snapshot before it is allowed to replace the library
pub fn validate_snapshot(snapshot: &LibrarySnapshot) -> BackupResult<()> {
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
            snapshot.format_version
        )));
    }

    let mut category_ids = HashSet::new();
    let mut category_names = HashSet::new();
    for category in &snapshot.categories {
        if category.name.trim().is_empty() {
            return Err(invalid(format!("category {} has an empty name", category.id)));
        }
        if !category_ids.insert(category.id.as_str()) {
            return Err(invalid(format!("duplicate category id {}", category.id)));
        }
        if is_reserved_name(&category.name) {
            return Err(invalid(format!(
                "category {} uses the reserved name '{}'",
                category.id, category.name
            )));
        }
        if !category_names.insert(category.name.trim()) {
            return Err(invalid(format!("duplicate category name '{}'", category.name)));
        }
        if category.is_default != (category.id == DEFAULT_CATEGORY_ID) {
            return Err(invalid(format!(
                "only category '{DEFAULT_CATEGORY_ID}' may be the default"
            )));
        }
    }
    if !category_ids.contains(DEFAULT_CATEGORY_ID) {
        return Err(invalid("default category is missing".to_string()));
    }

    let mut word_ids = HashSet::new();
    for word in &snapshot.words {
        if !word_ids.insert(word.id.as_str()) {
            return Err(invalid(format!("duplicate word id {}", word.id)));
        }
        if word.source_text.trim().is_empty() || word.translation.trim().is_empty() {
            return Err(invalid(format!("word {} has empty text", word.id)));
        }
        if !category_ids.contains(word.category_id.as_str()) {
            return Err(invalid(format!(
                "word {} refers to unknown category {}",
                word.id, word.category_id
            )));
        }
    }

    let mut dates = HashSet::new();
    for entry in &snapshot.study_log {
        if !dates.insert(entry.date) {
            return Err(invalid(format!("duplicate study log date {}", entry.date)));
        }
    }

    Ok(())
}

/// Replace the library with a snapshot
pub fn import_snapshot(
    db: &DatabaseManager,
    snapshot: &LibrarySnapshot,
) -> BackupResult<ImportReport> {
    validate_snapshot(snapshot)?;

    let report = db.transaction(|conn| {
        conn.execute("DELETE FROM word", [])?;
        conn.execute("DELETE FROM study_log", [])?;
        conn.execute("DELETE FROM category WHERE id != ?1", params![DEFAULT_CATEGORY_ID])?;

        let mut report = ImportReport::default();
        for category in &snapshot.categories {
            if category.id == DEFAULT_CATEGORY_ID {
                conn.execute(
                    "UPDATE category SET name = ?1 WHERE id = ?2",
                    params![category.name.trim(), DEFAULT_CATEGORY_ID],
                )?;
            } else {
                CategoryRepository::insert_category_internal(conn, category)?;
                report.categories_created += 1;
            }
        }

        for word in &snapshot.words {
            WordRepository::insert_word_internal(conn, word)?;
        }
        report.words_imported = snapshot.words.len();

        SettingsRepository::save_settings_internal(conn, snapshot.settings)?;

        for entry in &snapshot.study_log {
            StudyLogRepository::put_entry_internal(conn, entry)?;
        }
        report.study_log_entries = snapshot.study_log.len();

        Ok(report)
    })?;

    tracing::info!(
        words = report.words_imported,
        categories = report.categories_created,
        study_log = report.study_log_entries,
        "library restored from snapshot"
    );
    Ok(report)
}

pub fn export_json_file(
    db: &DatabaseManager,
    path: impl AsRef<Path>,
) -> BackupResult<LibrarySnapshot> {
    let snapshot = export_snapshot(db)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
    writer.flush()?;
    Ok(snapshot)
}

pub fn import_json_file(
    db: &DatabaseManager,
    path: impl AsRef<Path>,
) -> BackupResult<ImportReport> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let snapshot: LibrarySnapshot = serde_json::from_reader(reader)?;
    import_snapshot(db, &snapshot)
}

fn invalid(message: String) -> BackupError {
    BackupError::Invalid(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NewWord;
    use chrono::NaiveDate;
    use wordcard_algo::WordCounters;

    fn populated() -> DatabaseManager {
        let db = DatabaseManager::in_memory().unwrap();
        let verbs = db.categories().create_category("Verbs").unwrap();
        let run = db.words().add_word(NewWord::new("run", "courir", &verbs.id)).unwrap();
        db.words()
            .add_word(
                NewWord::new("house", "maison", DEFAULT_CATEGORY_ID).with_phonetic("/mɛzɔ̃/"),
            )
            .unwrap();
        db.words()
            .update_counters(
                &run.id,
                WordCounters::default(),
                WordCounters {
                    wrong_count: 2,
                    correct_streak: 1,
                },
            )
            .unwrap();
        db.settings()
            .save_settings(Settings {
                daily_goal: 15,
                graduation_streak: 4,
            })
            .unwrap();
        db.study_log()
            .append(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(), 12, "all")
            .unwrap();
        db
    }

    #[test]
    fn test_snapshot_restores_into_fresh_database() {
        let source = populated();
        let snapshot = export_snapshot(&source).unwrap();
        assert_eq!(snapshot.categories.len(), 2);

        let target = DatabaseManager::in_memory().unwrap();
        target.words().add_word(NewWord::new("stale", "vieux", DEFAULT_CATEGORY_ID)).unwrap();

        let report = import_snapshot(&target, &snapshot).unwrap();
        assert_eq!(report.words_imported, 2);
        assert_eq!(report.categories_created, 1);
        assert_eq!(report.study_log_entries, 1);

        assert_eq!(target.words().list_words().unwrap(), source.words().list_words().unwrap());
        assert_eq!(target.settings().get_settings().unwrap().daily_goal, 15);
        assert_eq!(target.study_log().total_studied().unwrap(), 12);
    }

    #[test]
    fn test_invalid_snapshot_leaves_database_untouched() {
        let source = populated();
        let mut snapshot = export_snapshot(&source).unwrap();
        snapshot.words[0].category_id = "nowhere".to_string();

        let target = DatabaseManager::in_memory().unwrap();
        target.words().add_word(NewWord::new("keep", "garder", DEFAULT_CATEGORY_ID)).unwrap();

        let err = import_snapshot(&target, &snapshot).unwrap_err();
        assert!(matches!(err, BackupError::Invalid(_)));
        assert_eq!(target.words().list_words().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_versions_and_missing_default() {
        let source = populated();
        let snapshot = export_snapshot(&source).unwrap();

        let mut future = snapshot.clone();
        future.format_version = 99;
        assert!(matches!(validate_snapshot(&future), Err(BackupError::Invalid(_))));

        let mut no_default = snapshot.clone();
        no_default.categories.retain(|c| !c.is_default);
        no_default.words.retain(|w| w.category_id != DEFAULT_CATEGORY_ID);
        assert!(matches!(validate_snapshot(&no_default), Err(BackupError::Invalid(_))));

        let mut scope_named = snapshot.clone();
        let verbs = scope_named.categories.iter_mut().find(|c| !c.is_default).unwrap();
        verbs.name = "wrong".to_string();
        assert!(matches!(validate_snapshot(&scope_named), Err(BackupError::Invalid(_))));

        let mut duplicate_day = snapshot;
        let entry = duplicate_day.study_log[0].clone();
        duplicate_day.study_log.push(entry);
        assert!(matches!(validate_snapshot(&duplicate_day), Err(BackupError::Invalid(_))));
    }

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let snapshot = export_snapshot(&populated()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["formatVersion"], 1);
        assert_eq!(json["settings"]["dailyGoal"], 15);
        assert!(json["words"][0].get("wrongCount").is_some());
        assert_eq!(json["studyLog"][0]["date"], "2024-02-03");
    }
}
