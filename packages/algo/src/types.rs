//! Common Types and Constants
//!
//! Shared data structures used by the scheduler, the retention rules and the
//! storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Slots of every daily set reserved for words outside the wrong pool
pub const RESERVED_NEW_SLOTS: u32 = 2;

/// Default number of cards per session
pub const DEFAULT_DAILY_GOAL: u32 = 10;

/// Default consecutive correct answers needed to leave the wrong pool
pub const DEFAULT_GRADUATION_STREAK: u32 = 3;

/// Upper bound accepted for the daily goal
pub const MAX_DAILY_GOAL: u32 = 500;

/// Upper bound accepted for the graduation streak
pub const MAX_GRADUATION_STREAK: u32 = 50;

/// Scope string selecting every word
pub const SCOPE_ALL: &str = "all";

/// Scope string selecting the wrong pool
pub const SCOPE_WRONG: &str = "wrong";

// ==================== Scope ====================

/// Selection target for a study session
///
/// `All` and `Wrong` are virtual categories; anything else names a stored
/// category by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    #[default]
    All,
    Wrong,
    Category(String),
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Scope::All => SCOPE_ALL,
            Scope::Wrong => SCOPE_WRONG,
            Scope::Category(id) => id.as_str(),
        }
    }

    /// Whether a word belongs to this scope
    ///
    /// For `Wrong` this is pool membership (`wrong_count >= 1`).
    pub fn contains(&self, word: &Word) -> bool {
        match self {
            Scope::All => true,
            Scope::Wrong => word.is_wrong(),
            Scope::Category(id) => word.category_id == *id,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        match s {
            SCOPE_ALL => Scope::All,
            SCOPE_WRONG => Scope::Wrong,
            other => Scope::Category(other.to_string()),
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        match s.as_str() {
            SCOPE_ALL => Scope::All,
            SCOPE_WRONG => Scope::Wrong,
            _ => Scope::Category(s),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Category(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for Scope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Scope::from(s))
    }
}

// ==================== Word ====================

/// Mutable per-word counters driving the wrong pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCounters {
    /// Times answered wrong since the last graduation; 0 = not in the wrong pool
    pub wrong_count: u32,
    /// Consecutive correct answers since the last miss or graduation
    pub correct_streak: u32,
}

/// Registered vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub source_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    pub translation: String,
    pub category_id: String,
    #[serde(default)]
    pub wrong_count: u32,
    #[serde(default)]
    pub correct_streak: u32,
    pub created_at: DateTime<Utc>,
}

impl Word {
    pub fn counters(&self) -> WordCounters {
        WordCounters {
            wrong_count: self.wrong_count,
            correct_streak: self.correct_streak,
        }
    }

    pub fn set_counters(&mut self, counters: WordCounters) {
        self.wrong_count = counters.wrong_count;
        self.correct_streak = counters.correct_streak;
    }

    /// In the wrong pool
    pub fn is_wrong(&self) -> bool {
        self.wrong_count >= 1
    }
}

// ==================== Category ====================

/// Named group of words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

// ==================== Settings ====================

/// Study settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Cards per session for `all` and per-category scopes
    pub daily_goal: u32,
    /// Consecutive correct answers required to clear a word's wrong state
    pub graduation_streak: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            graduation_streak: DEFAULT_GRADUATION_STREAK,
        }
    }
}
