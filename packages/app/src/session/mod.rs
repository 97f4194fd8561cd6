//! Study sessions
//!
//! A session is one bounded run through today's scheduled words: show a card,
//! flip it, record right or wrong, move on. Reaching the end commits a single
//! study log entry for the day.
//!
//! [`SessionEngine`] owns the in-memory state; the words and counters it
//! touches live behind the [`crate::store`] traits.

mod engine;

pub use engine::SessionEngine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wordcard_algo::{AnswerEffect, Scope, Word};

use crate::storage::StorageError;

// ============================================================
// Errors
// ============================================================

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no words to study in scope '{0}'; add some words first")]
    EmptyPool(Scope),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ============================================================
// Session state
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Active,
    /// Every card answered and the study log written
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub word_id: String,
    pub correct: bool,
}

/// In-memory state of one study run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub scope: Scope,
    /// Scheduled cards; fixed for the life of the session
    pub words: Vec<Word>,
    pub current_index: usize,
    pub results: Vec<AnswerRecord>,
    pub is_flipped: bool,
    pub started_at: DateTime<Utc>,
    pub state: SessionState,
}

impl Session {
    pub(crate) fn new(scope: Scope, words: Vec<Word>) -> Self {
        Self {
            scope,
            words,
            current_index: 0,
            results: Vec::new(),
            is_flipped: false,
            started_at: Utc::now(),
            state: SessionState::Active,
        }
    }

    pub fn current_card(&self) -> Option<&Word> {
        self.words.get(self.current_index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.current_index, self.words.len())
    }
}

// ============================================================
// Results
// ============================================================

/// Returned by every recorded answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// The answer finished the session
    pub done: bool,
    /// Index of the next card (equals `total` when done)
    pub index: usize,
    pub total: usize,
    /// `None` when the word was deleted mid-session and nothing was stored
    pub effect: Option<AnswerEffect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent; 0 for an empty session
    pub percent: u32,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (current as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            current,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Answers recorded so far
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    /// Current records of the missed words that still exist
    pub wrong_words: Vec<Word>,
    pub scope: Scope,
}
