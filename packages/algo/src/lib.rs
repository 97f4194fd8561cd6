//! # wordcard-algo - flashcard quiz algorithms
//!
//! Pure Rust policy for the wordcard vocabulary app:
//!
//! - **Daily selection** - which words a learner sees today
//! - **Retention rule** - how answers move words in and out of the wrong pool
//! - **Sanitizing** - settings clamping and text normalization
//!
//! Nothing here touches storage; callers pass the word pool and settings in
//! and persist the returned counters themselves.
//!
//! ## Module layout
//!
//! - [`scheduler`] - daily word selection (quotas, ordering, seeded shuffle)
//! - [`retention`] - streak counting and graduation
//! - [`sanitize`] - settings and text validation
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use wordcard_algo::{apply_answer, DailySelector, Scope, Settings, WordCounters};
//!
//! let mut selector = DailySelector::with_seed(42);
//! let today = selector.select(&Scope::All, &[], &Settings::default());
//! assert!(today.is_empty());
//!
//! let update = apply_answer(WordCounters { wrong_count: 1, correct_streak: 2 }, true, 3);
//! assert_eq!(update.counters, WordCounters::default());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod retention;
pub mod sanitize;
pub mod scheduler;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use retention::{answers_to_graduation, apply_answer, AnswerEffect, AnswerUpdate};

pub use scheduler::{
    max_wrong_slots, plan_daily_words, select_daily_words, DailyPlan, DailySelector,
    DailySelectorOptions,
};

pub use sanitize::{sanitize_settings, validate_settings};
