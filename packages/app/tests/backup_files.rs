//! Backup files on disk.

mod common;

use std::fs;

use wordcard::backup::{self, BackupError};
use wordcard::storage::DatabaseManager;

use common::{insert_word, set_settings, test_day};

#[test]
fn json_backup_restores_into_a_new_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let backup_path = dir.path().join("library.json");

    {
        let source = DatabaseManager::new(dir.path().join("source.db")).unwrap();
        let verbs = source.categories().create_category("Verbs").unwrap();
        insert_word(&source, "a", &verbs.id, 3, 0);
        insert_word(&source, "b", "default", 0, 1);
        set_settings(&source, 20, 5);
        source.study_log().append(test_day(), 8, "all").unwrap();

        let snapshot = backup::export_json_file(&source, &backup_path).unwrap();
        assert_eq!(snapshot.words.len(), 2);
    }

    let target = DatabaseManager::new(dir.path().join("target.db")).unwrap();
    let report = backup::import_json_file(&target, &backup_path).unwrap();
    assert_eq!(report.words_imported, 2);

    let restored = target.words().get_word("a").unwrap().unwrap();
    assert_eq!(restored.wrong_count, 3);
    let verbs = target.categories().find_by_name("Verbs").unwrap().unwrap();
    assert_eq!(verbs.id, restored.category_id);
    assert_eq!(target.settings().get_settings().unwrap().graduation_streak, 5);
    assert_eq!(target.study_log().get(test_day()).unwrap().unwrap().count, 8);
}

#[test]
fn malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"formatVersion\": 1, ").unwrap();

    let db = DatabaseManager::in_memory().unwrap();
    let err = backup::import_json_file(&db, &path).unwrap_err();
    assert!(matches!(err, BackupError::Json(_)));

    let err = backup::import_json_file(&db, dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, BackupError::Io(_)));
}

#[test]
fn csv_file_round_trip_keeps_categories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.csv");

    let source = DatabaseManager::in_memory().unwrap();
    let food = source.categories().create_category("Food").unwrap();
    insert_word(&source, "x", &food.id, 4, 0);
    insert_word(&source, "y", "default", 0, 1);
    assert_eq!(backup::export_csv_file(&source, &path).unwrap(), 2);

    let target = DatabaseManager::in_memory().unwrap();
    let report = backup::import_csv_file(&target, &path).unwrap();
    assert_eq!(report.words_imported, 2);
    assert_eq!(report.categories_created, 1);

    // counters are not part of the csv format
    let words = target.words().list_words().unwrap();
    assert!(words.iter().all(|w| w.wrong_count == 0));
    let food_id = target.categories().find_by_name("Food").unwrap().unwrap().id;
    assert_eq!(target.words().count_words_by_category(&food_id).unwrap(), 1);
}
