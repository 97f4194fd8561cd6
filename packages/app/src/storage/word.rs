//! Word repository
//!
//! CRUD for words plus the counter update used by the quiz.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use wordcard_algo::sanitize::{clean_optional_text, clean_text};
use wordcard_algo::{Word, WordCounters};

use crate::storage::models::{format_datetime, word_from_row, NewWord, WordEdit, WORD_COLUMNS};
use crate::storage::{lock_connection, StorageError, StorageResult};

/// Word repository
///
/// Listing order is registration order (`created_at`, then insertion order),
/// which is also the tie-break order the scheduler relies on.
pub struct WordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WordRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.conn)
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn get_word(&self, id: &str) -> StorageResult<Option<Word>> {
        let conn = self.get_conn()?;
        Self::get_word_internal(&conn, id)
    }

    pub fn list_words(&self) -> StorageResult<Vec<Word>> {
        let conn = self.get_conn()?;
        Self::list_words_internal(&conn)
    }

    pub fn list_words_by_category(&self, category_id: &str) -> StorageResult<Vec<Word>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WORD_COLUMNS} FROM word WHERE category_id = ?1 \
             ORDER BY created_at ASC, rowid ASC"
        ))?;
        let words = stmt
            .query_map(params![category_id], word_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    /// Words currently in the wrong pool, most missed first
    pub fn list_wrong_words(&self) -> StorageResult<Vec<Word>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WORD_COLUMNS} FROM word WHERE wrong_count > 0 \
             ORDER BY wrong_count DESC, created_at ASC, rowid ASC"
        ))?;
        let words = stmt
            .query_map([], word_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    pub fn count_words_by_category(&self, category_id: &str) -> StorageResult<u32> {
        let conn = self.get_conn()?;
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM word WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ============================================================
    // Writes
    // ============================================================

    /// Register a word
    ///
    /// Source text and translation are trimmed and must not be empty; the
    /// category must exist.
    pub fn add_word(&self, input: NewWord) -> StorageResult<Word> {
        let conn = self.get_conn()?;
        Self::add_word_internal(&conn, input)
    }

    /// Edit text fields or move the word to another category
    pub fn update_word(&self, id: &str, edit: WordEdit) -> StorageResult<Word> {
        let conn = self.get_conn()?;
        let mut word = Self::get_word_internal(&conn, id)?
            .ok_or_else(|| StorageError::NotFound(format!("word {id}")))?;

        if let Some(source_text) = edit.source_text {
            word.source_text = clean_text(&source_text)
                .ok_or_else(|| StorageError::Validation("source text is empty".to_string()))?;
        }
        if let Some(phonetic) = edit.phonetic {
            word.phonetic = clean_optional_text(phonetic.as_deref());
        }
        if let Some(translation) = edit.translation {
            word.translation = clean_text(&translation)
                .ok_or_else(|| StorageError::Validation("translation is empty".to_string()))?;
        }
        if let Some(category_id) = edit.category_id {
            ensure_category_exists(&conn, &category_id)?;
            word.category_id = category_id;
        }

        conn.execute(
            r#"
            UPDATE word SET
                source_text = ?1,
                phonetic = ?2,
                translation = ?3,
                category_id = ?4,
                updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                word.source_text,
                word.phonetic,
                word.translation,
                word.category_id,
                format_datetime(Utc::now()),
                word.id,
            ],
        )?;

        Ok(word)
    }

    /// Delete a word; `false` when it did not exist
    pub fn delete_word(&self, id: &str) -> StorageResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM word WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Compare-and-swap the quiz counters
    ///
    /// The row is only written when its stored counters still equal
    /// `expected`. Returns `false` when the word is gone or was changed by
    /// another writer; the caller re-reads and retries.
    pub fn update_counters(
        &self,
        id: &str,
        expected: WordCounters,
        next: WordCounters,
    ) -> StorageResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE word SET
                wrong_count = ?1,
                correct_streak = ?2,
                updated_at = ?3
            WHERE id = ?4 AND wrong_count = ?5 AND correct_streak = ?6
            "#,
            params![
                next.wrong_count,
                next.correct_streak,
                format_datetime(Utc::now()),
                id,
                expected.wrong_count,
                expected.correct_streak,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Take a word out of the wrong pool by hand
    pub fn reset_counters(&self, id: &str) -> StorageResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE word SET wrong_count = 0, correct_streak = 0, updated_at = ?1 WHERE id = ?2",
            params![format_datetime(Utc::now()), id],
        )?;
        Ok(affected > 0)
    }

    // ============================================================
    // Internal (take &Connection, usable inside transactions)
    // ============================================================

    pub fn get_word_internal(conn: &Connection, id: &str) -> StorageResult<Option<Word>> {
        let word = conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} FROM word WHERE id = ?1"),
                params![id],
                word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    pub fn list_words_internal(conn: &Connection) -> StorageResult<Vec<Word>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {WORD_COLUMNS} FROM word ORDER BY created_at ASC, rowid ASC"
        ))?;
        let words = stmt
            .query_map([], word_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    pub fn add_word_internal(conn: &Connection, input: NewWord) -> StorageResult<Word> {
        let source_text = clean_text(&input.source_text)
            .ok_or_else(|| StorageError::Validation("source text is empty".to_string()))?;
        let translation = clean_text(&input.translation)
            .ok_or_else(|| StorageError::Validation("translation is empty".to_string()))?;
        ensure_category_exists(conn, &input.category_id)?;

        let word = Word {
            id: Uuid::new_v4().to_string(),
            source_text,
            phonetic: clean_optional_text(input.phonetic.as_deref()),
            translation,
            category_id: input.category_id,
            wrong_count: 0,
            correct_streak: 0,
            created_at: Utc::now(),
        };
        Self::insert_word_internal(conn, &word)?;

        tracing::debug!(word_id = %word.id, category_id = %word.category_id, "word added");
        Ok(word)
    }

    /// Insert a fully formed word as-is (restore path)
    pub fn insert_word_internal(conn: &Connection, word: &Word) -> StorageResult<()> {
        let created_at = format_datetime(word.created_at);
        conn.execute(
            r#"
            INSERT INTO word (
                id, source_text, phonetic, translation, category_id,
                wrong_count, correct_streak, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                word.id,
                word.source_text,
                word.phonetic,
                word.translation,
                word.category_id,
                word.wrong_count,
                word.correct_streak,
                created_at,
                format_datetime(Utc::now()),
            ],
        )?;
        Ok(())
    }
}

fn ensure_category_exists(conn: &Connection, category_id: &str) -> StorageResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1)",
        params![category_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StorageError::NotFound(format!("category {category_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations;
    use crate::storage::DEFAULT_CATEGORY_ID;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory connection");
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .expect("Failed to set pragma");
        migrations::run_migrations(&conn).expect("Failed to run migrations");
        Arc::new(Mutex::new(conn))
    }

    fn add(repo: &WordRepository, source: &str) -> Word {
        repo.add_word(NewWord::new(source, format!("{source}-tr"), DEFAULT_CATEGORY_ID))
            .expect("Failed to add word")
    }

    #[test]
    fn test_add_and_get_word() {
        let repo = WordRepository::new(setup_test_db());

        let word = repo
            .add_word(
                NewWord::new("  apple ", "りんご", DEFAULT_CATEGORY_ID).with_phonetic(" ˈæpəl "),
            )
            .unwrap();
        assert_eq!(word.source_text, "apple");
        assert_eq!(word.phonetic.as_deref(), Some("ˈæpəl"));
        assert_eq!(word.wrong_count, 0);

        let loaded = repo.get_word(&word.id).unwrap().expect("word not found");
        assert_eq!(loaded, word);
    }

    #[test]
    fn test_add_word_rejects_blank_fields() {
        let repo = WordRepository::new(setup_test_db());

        let err = repo
            .add_word(NewWord::new("   ", "x", DEFAULT_CATEGORY_ID))
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = repo
            .add_word(NewWord::new("x", "", DEFAULT_CATEGORY_ID))
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[test]
    fn test_add_word_requires_existing_category() {
        let repo = WordRepository::new(setup_test_db());
        let err = repo.add_word(NewWord::new("a", "b", "missing")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_list_words_in_registration_order() {
        let repo = WordRepository::new(setup_test_db());
        for source in ["one", "two", "three"] {
            add(&repo, source);
        }

        let sources: Vec<String> = repo
            .list_words()
            .unwrap()
            .into_iter()
            .map(|w| w.source_text)
            .collect();
        assert_eq!(sources, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_update_word_keeps_counters() {
        let repo = WordRepository::new(setup_test_db());
        let word = add(&repo, "cat");
        assert!(repo
            .update_counters(
                &word.id,
                WordCounters::default(),
                WordCounters {
                    wrong_count: 2,
                    correct_streak: 0
                }
            )
            .unwrap());

        let edited = repo
            .update_word(
                &word.id,
                WordEdit {
                    translation: Some("猫".to_string()),
                    phonetic: Some(Some("kæt".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.translation, "猫");
        assert_eq!(edited.wrong_count, 2);

        let cleared = repo
            .update_word(
                &word.id,
                WordEdit {
                    phonetic: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.phonetic, None);
    }

    #[test]
    fn test_update_missing_word() {
        let repo = WordRepository::new(setup_test_db());
        let err = repo.update_word("nope", WordEdit::default()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_update_counters_compare_and_swap() {
        let repo = WordRepository::new(setup_test_db());
        let word = add(&repo, "dog");
        let missed = WordCounters {
            wrong_count: 1,
            correct_streak: 0,
        };

        assert!(repo
            .update_counters(&word.id, WordCounters::default(), missed)
            .unwrap());
        // stale expectation loses
        assert!(!repo
            .update_counters(&word.id, WordCounters::default(), missed)
            .unwrap());
        // unknown id
        assert!(!repo.update_counters("ghost", missed, missed).unwrap());

        let stored = repo.get_word(&word.id).unwrap().unwrap();
        assert_eq!(stored.counters(), missed);
    }

    #[test]
    fn test_wrong_words_and_reset() {
        let repo = WordRepository::new(setup_test_db());
        let a = add(&repo, "a");
        let b = add(&repo, "b");
        add(&repo, "c");

        let wrong_by = |wrong_count| WordCounters {
            wrong_count,
            correct_streak: 0,
        };
        repo.update_counters(&a.id, WordCounters::default(), wrong_by(1))
            .unwrap();
        repo.update_counters(&b.id, WordCounters::default(), wrong_by(4))
            .unwrap();

        let wrong: Vec<String> = repo
            .list_wrong_words()
            .unwrap()
            .into_iter()
            .map(|w| w.source_text)
            .collect();
        assert_eq!(wrong, vec!["b", "a"]);

        assert!(repo.reset_counters(&b.id).unwrap());
        assert_eq!(repo.list_wrong_words().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_word() {
        let repo = WordRepository::new(setup_test_db());
        let word = add(&repo, "gone");

        assert!(repo.delete_word(&word.id).unwrap());
        assert!(!repo.delete_word(&word.id).unwrap());
        assert!(repo.get_word(&word.id).unwrap().is_none());
        assert_eq!(repo.count_words_by_category(DEFAULT_CATEGORY_ID).unwrap(), 0);
    }
}
