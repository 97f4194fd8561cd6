//! Streak-based retention rule
//!
//! A word enters the wrong pool on its first miss and stays there until it is
//! answered correctly `graduation_streak` times in a row. Graduation clears
//! both counters so the word starts over as a fresh, unseen-in-pool entry.

use serde::{Deserialize, Serialize};

use crate::types::WordCounters;

/// What a single answer did to a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerEffect {
    /// Correct answer, streak grew (word may or may not be in the wrong pool)
    StreakExtended,
    /// Correct answer completed the streak; word left the wrong pool
    Graduated,
    /// Wrong answer; miss counted, streak cleared
    Missed,
}

/// Counters after an answer plus the effect that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerUpdate {
    pub counters: WordCounters,
    pub effect: AnswerEffect,
}

/// Apply one answer to a word's counters
///
/// - correct: `correct_streak += 1`; if the word is in the wrong pool and the
///   streak reached `graduation_streak`, both counters reset to 0
/// - wrong: `wrong_count += 1`, `correct_streak = 0`
///
/// A `graduation_streak` of 0 is treated as 1.
pub fn apply_answer(counters: WordCounters, correct: bool, graduation_streak: u32) -> AnswerUpdate {
    if !correct {
        return AnswerUpdate {
            counters: WordCounters {
                wrong_count: counters.wrong_count.saturating_add(1),
                correct_streak: 0,
            },
            effect: AnswerEffect::Missed,
        };
    }

    let streak = counters.correct_streak.saturating_add(1);
    if counters.wrong_count > 0 && streak >= graduation_streak.max(1) {
        AnswerUpdate {
            counters: WordCounters::default(),
            effect: AnswerEffect::Graduated,
        }
    } else {
        AnswerUpdate {
            counters: WordCounters {
                wrong_count: counters.wrong_count,
                correct_streak: streak,
            },
            effect: AnswerEffect::StreakExtended,
        }
    }
}

/// Correct answers still needed before the word graduates; 0 outside the pool
pub fn answers_to_graduation(counters: WordCounters, graduation_streak: u32) -> u32 {
    if counters.wrong_count == 0 {
        return 0;
    }
    graduation_streak
        .max(1)
        .saturating_sub(counters.correct_streak)
}
