//! Property-Based Tests for whole study sessions
//!
//! Invariants covered:
//! - Completion: answering every card writes one study log entry whose count
//!   equals the session length
//! - Tally: the summary splits the answers into correct and wrong
//! - Counters: missed new words enter the wrong pool, the rest stay out
//! - Abandonment: clearing a session part way writes no study log entry

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use wordcard::storage::DatabaseManager;
use wordcard::{Scope, SessionEngine};
use wordcard_algo::DailySelector;

use common::{insert_default_words, memory_db, set_settings, test_day};

fn engine(db: &Arc<DatabaseManager>, seed: u64) -> SessionEngine<Arc<DatabaseManager>> {
    SessionEngine::with_selector(Arc::clone(db), DailySelector::with_seed(seed))
        .with_clock(test_day)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_answers() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..12)
}

// ============================================================================
// Session properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn completed_session_logs_every_card(answers in arb_answers(), seed in any::<u64>()) {
        let db = memory_db();
        set_settings(&db, 20, 3);
        insert_default_words(&db, "n", answers.len(), 0);

        let mut engine = engine(&db, seed);
        let total = engine.start_session(Scope::All).unwrap().len();
        prop_assert_eq!(total, answers.len());

        let mut missed = HashSet::new();
        for (i, correct) in answers.iter().copied().enumerate() {
            let card_id = engine.current_card().unwrap().id.clone();
            if !correct {
                missed.insert(card_id);
            }
            let outcome = engine.answer(correct).unwrap().unwrap();
            prop_assert_eq!(outcome.index, i + 1);
            prop_assert_eq!(outcome.done, i + 1 == total);
        }
        prop_assert!(engine.session().unwrap().is_completed());
        prop_assert!(engine.answer(true).unwrap().is_none());

        let entry = db.study_log().get(test_day()).unwrap().unwrap();
        prop_assert_eq!(entry.count as usize, total);

        let summary = engine.session_result().unwrap().unwrap();
        prop_assert_eq!(summary.correct + summary.wrong, total);
        prop_assert_eq!(summary.wrong, missed.len());

        for word in db.words().list_words().unwrap() {
            prop_assert_eq!(word.is_wrong(), missed.contains(&word.id));
        }
    }

    #[test]
    fn abandoned_session_writes_no_log(
        answers in arb_answers(),
        unanswered in 1usize..4,
        seed in any::<u64>(),
    ) {
        let db = memory_db();
        set_settings(&db, 20, 3);
        insert_default_words(&db, "n", answers.len() + unanswered, 0);

        let mut engine = engine(&db, seed);
        engine.start_session(Scope::All).unwrap();
        for correct in answers.iter().copied() {
            let outcome = engine.answer(correct).unwrap().unwrap();
            prop_assert!(!outcome.done);
        }
        engine.clear_session();

        prop_assert!(db.study_log().get(test_day()).unwrap().is_none());
        prop_assert_eq!(db.study_log().total_studied().unwrap(), 0);

        // answers already given still count
        let missed = answers.iter().filter(|correct| !**correct).count();
        prop_assert_eq!(db.words().list_wrong_words().unwrap().len(), missed);
    }
}
