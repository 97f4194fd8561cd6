//! Daily Word Selection
//!
//! Decides which words a learner sees in one session.
//!
//! Core policy:
//! - `wrong` scope: the wrong pool only, shuffled and capped at the daily goal
//! - `all` / category scope: the most-missed words first, always leaving at
//!   least [`RESERVED_NEW_SLOTS`] slots for words outside the wrong pool, the
//!   rest filled with the oldest registered new words
//! - the final set is shuffled so presentation order does not reveal which
//!   words came from the wrong pool
//!
//! Randomness comes from an injected RNG. [`DailySelector`] owns a seedable
//! `ChaCha8Rng` so tests can pin the exact order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{Scope, Settings, Word, RESERVED_NEW_SLOTS};

// ==================== Data Structures ====================

/// Unshuffled result of the selection step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyPlan {
    /// Wrong-pool words, most missed first
    pub wrong: Vec<Word>,
    /// Words outside the wrong pool, oldest first
    pub new: Vec<Word>,
}

impl DailyPlan {
    /// Concatenate wrong words then new words, in selection order
    pub fn into_words(self) -> Vec<Word> {
        let mut words = self.wrong;
        words.extend(self.new);
        words
    }
}

/// Selector configuration
#[derive(Debug, Clone, Default)]
pub struct DailySelectorOptions {
    /// Random seed for reproducible shuffles (system time when absent)
    pub seed: Option<u64>,
}

// ==================== Selection ====================

/// Number of wrong-pool slots available for a daily goal
///
/// Saturates at 0 when the goal is smaller than the reserved new-word slots.
pub fn max_wrong_slots(daily_goal: u32) -> usize {
    daily_goal.saturating_sub(RESERVED_NEW_SLOTS) as usize
}

/// Select today's words in selection order, without shuffling
pub fn plan_daily_words(scope: &Scope, words: &[Word], settings: &Settings) -> DailyPlan {
    let daily_goal = settings.daily_goal as usize;

    if *scope == Scope::Wrong {
        let wrong: Vec<Word> = words.iter().filter(|w| w.is_wrong()).cloned().collect();
        return DailyPlan {
            wrong,
            new: Vec::new(),
        };
    }

    let pool: Vec<&Word> = words.iter().filter(|w| scope.contains(w)).collect();

    // sort_by is stable: equal counts keep their original relative order
    let mut wrong: Vec<Word> = pool.iter().filter(|w| w.is_wrong()).map(|w| (*w).clone()).collect();
    wrong.sort_by(|a, b| b.wrong_count.cmp(&a.wrong_count));
    wrong.truncate(max_wrong_slots(settings.daily_goal));

    let mut new: Vec<Word> = pool.iter().filter(|w| !w.is_wrong()).map(|w| (*w).clone()).collect();
    new.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    new.truncate(daily_goal.saturating_sub(wrong.len()));

    DailyPlan { wrong, new }
}

/// Select and shuffle today's words
///
/// In the `wrong` scope the whole pool is shuffled before being cut to the
/// daily goal, so every wrong word has the same chance of being picked.
pub fn select_daily_words<R: Rng + ?Sized>(
    scope: &Scope,
    words: &[Word],
    settings: &Settings,
    rng: &mut R,
) -> Vec<Word> {
    let mut selected = plan_daily_words(scope, words, settings).into_words();
    selected.shuffle(rng);
    if *scope == Scope::Wrong {
        selected.truncate(settings.daily_goal as usize);
    }
    selected
}

// ==================== Selector ====================

/// Daily selection with an owned, seedable random source
pub struct DailySelector {
    rng: ChaCha8Rng,
}

impl DailySelector {
    /// Create a selector seeded from the system clock
    pub fn new() -> Self {
        Self::with_options(DailySelectorOptions::default())
    }

    pub fn with_options(options: DailySelectorOptions) -> Self {
        let seed = options.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a selector with a specific seed (for testing)
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(DailySelectorOptions { seed: Some(seed) })
    }

    /// Reseed the random source
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn select(&mut self, scope: &Scope, words: &[Word], settings: &Settings) -> Vec<Word> {
        select_daily_words(scope, words, settings, &mut self.rng)
    }
}

impl Default for DailySelector {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Unit Tests ====================
