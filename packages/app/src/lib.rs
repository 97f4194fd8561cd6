//! # wordcard
//!
//! Local vocabulary flashcards. Words live in SQLite, grouped into
//! categories; each day a [`SessionEngine`] walks the learner through the
//! cards picked by `wordcard_algo` and records the result.
//!
//! ```rust
//! use std::sync::Arc;
//! use wordcard::storage::{DatabaseManager, NewWord, DEFAULT_CATEGORY_ID};
//! use wordcard::{Scope, SessionEngine};
//!
//! let db = Arc::new(DatabaseManager::in_memory().unwrap());
//! db.words().add_word(NewWord::new("gato", "cat", DEFAULT_CATEGORY_ID)).unwrap();
//!
//! let mut engine = SessionEngine::new(Arc::clone(&db));
//! engine.start_session(Scope::All).unwrap();
//! engine.flip();
//! let outcome = engine.answer(false).unwrap().unwrap();
//! assert!(outcome.done);
//! assert_eq!(db.words().list_wrong_words().unwrap().len(), 1);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod logging;
pub mod session;
pub mod storage;
pub mod store;

pub use session::{
    AnswerOutcome, AnswerRecord, Progress, Session, SessionEngine, SessionError, SessionState,
    SessionSummary,
};
pub use storage::{DatabaseManager, StorageError, StorageResult};
pub use store::{QuizStore, SettingsStore, StudyLogStore, WordStore};

pub use wordcard_algo::{Category, Scope, Settings, Word, WordCounters};
