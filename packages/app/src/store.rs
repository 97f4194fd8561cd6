//! Store traits consumed by the session engine
//!
//! The engine only needs a narrow slice of storage: reading words and
//! settings, swapping one word's counters and appending to the study log.
//! [`DatabaseManager`] implements all three; tests can supply their own.

use std::sync::Arc;

use chrono::NaiveDate;
use wordcard_algo::{Scope, Settings, Word, WordCounters};

use crate::storage::{
    DatabaseManager, SettingsRepository, StorageResult, StudyLogEntry, StudyLogRepository,
    WordRepository,
};

pub trait WordStore {
    /// Every word, in registration order
    fn list_words(&self) -> StorageResult<Vec<Word>>;

    fn list_words_by_category(&self, category_id: &str) -> StorageResult<Vec<Word>>;

    fn get_word(&self, id: &str) -> StorageResult<Option<Word>>;

    /// Replace the counters only if they still equal `expected`
    ///
    /// Returns `false` when the word is missing or was changed concurrently.
    fn update_word_counters(
        &self,
        id: &str,
        expected: WordCounters,
        next: WordCounters,
    ) -> StorageResult<bool>;
}

pub trait SettingsStore {
    fn get_settings(&self) -> StorageResult<Settings>;
}

pub trait StudyLogStore {
    /// Add `count` to the entry for `date`, creating it with `scope` if absent
    fn append_study_log(&self, date: NaiveDate, count: u32, scope: &Scope)
        -> StorageResult<StudyLogEntry>;
}

/// Everything a [`SessionEngine`](crate::session::SessionEngine) needs
pub trait QuizStore: WordStore + SettingsStore + StudyLogStore {}

impl<T: WordStore + SettingsStore + StudyLogStore> QuizStore for T {}

// ============================================================
// Repository impls
// ============================================================

impl WordStore for WordRepository {
    fn list_words(&self) -> StorageResult<Vec<Word>> {
        WordRepository::list_words(self)
    }

    fn list_words_by_category(&self, category_id: &str) -> StorageResult<Vec<Word>> {
        WordRepository::list_words_by_category(self, category_id)
    }

    fn get_word(&self, id: &str) -> StorageResult<Option<Word>> {
        WordRepository::get_word(self, id)
    }

    fn update_word_counters(
        &self,
        id: &str,
        expected: WordCounters,
        next: WordCounters,
    ) -> StorageResult<bool> {
        self.update_counters(id, expected, next)
    }
}

impl SettingsStore for SettingsRepository {
    fn get_settings(&self) -> StorageResult<Settings> {
        SettingsRepository::get_settings(self)
    }
}

impl StudyLogStore for StudyLogRepository {
    fn append_study_log(
        &self,
        date: NaiveDate,
        count: u32,
        scope: &Scope,
    ) -> StorageResult<StudyLogEntry> {
        self.append(date, count, scope.as_str())
    }
}

impl WordStore for DatabaseManager {
    fn list_words(&self) -> StorageResult<Vec<Word>> {
        self.words().list_words()
    }

    fn list_words_by_category(&self, category_id: &str) -> StorageResult<Vec<Word>> {
        self.words().list_words_by_category(category_id)
    }

    fn get_word(&self, id: &str) -> StorageResult<Option<Word>> {
        self.words().get_word(id)
    }

    fn update_word_counters(
        &self,
        id: &str,
        expected: WordCounters,
        next: WordCounters,
    ) -> StorageResult<bool> {
        self.words().update_counters(id, expected, next)
    }
}

impl SettingsStore for DatabaseManager {
    fn get_settings(&self) -> StorageResult<Settings> {
        self.settings().get_settings()
    }
}

impl StudyLogStore for DatabaseManager {
    fn append_study_log(
        &self,
        date: NaiveDate,
        count: u32,
        scope: &Scope,
    ) -> StorageResult<StudyLogEntry> {
        self.study_log().append(date, count, scope.as_str())
    }
}

// ============================================================
// Shared handles
// ============================================================

impl<T: WordStore + ?Sized> WordStore for Arc<T> {
    fn list_words(&self) -> StorageResult<Vec<Word>> {
        (**self).list_words()
    }

    fn list_words_by_category(&self, category_id: &str) -> StorageResult<Vec<Word>> {
        (**self).list_words_by_category(category_id)
    }

    fn get_word(&self, id: &str) -> StorageResult<Option<Word>> {
        (**self).get_word(id)
    }

    fn update_word_counters(
        &self,
        id: &str,
        expected: WordCounters,
        next: WordCounters,
    ) -> StorageResult<bool> {
        (**self).update_word_counters(id, expected, next)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn get_settings(&self) -> StorageResult<Settings> {
        (**self).get_settings()
    }
}

impl<T: StudyLogStore + ?Sized> StudyLogStore for Arc<T> {
    fn append_study_log(
        &self,
        date: NaiveDate,
        count: u32,
        scope: &Scope,
    ) -> StorageResult<StudyLogEntry> {
        (**self).append_study_log(date, count, scope)
    }
}
