use chrono::{Local, NaiveDate};

use wordcard_algo::{apply_answer, AnswerEffect, DailySelector, Scope, Word};

use crate::session::{
    AnswerOutcome, AnswerRecord, Progress, Session, SessionError, SessionState, SessionSummary,
};
use crate::storage::StorageError;
use crate::store::QuizStore;

/// Attempts at the counter compare-and-swap before giving up
const MAX_COUNTER_RETRIES: usize = 5;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Owned controller for one study run at a time
///
/// Starting a session replaces whatever session was in progress. Calls that
/// need a session (`flip`, `answer`, ...) are neutral no-ops without one.
pub struct SessionEngine<S> {
    store: S,
    selector: DailySelector,
    session: Option<Session>,
    today: fn() -> NaiveDate,
}

impl<S: QuizStore> SessionEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_selector(store, DailySelector::new())
    }

    /// Engine with a specific random source (fixed seeds in tests)
    pub fn with_selector(store: S, selector: DailySelector) -> Self {
        Self {
            store,
            selector,
            session: None,
            today: local_today,
        }
    }

    /// Override the calendar date used for study log entries
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Schedule today's words for `scope` and begin a new session
    pub fn start_session(&mut self, scope: Scope) -> Result<&Session, SessionError> {
        let settings = self.store.get_settings()?;
        let pool = match &scope {
            Scope::Category(id) => self.store.list_words_by_category(id)?,
            Scope::All | Scope::Wrong => self.store.list_words()?,
        };

        let words = self.selector.select(&scope, &pool, &settings);
        if words.is_empty() {
            tracing::info!(scope = %scope, pool = pool.len(), "nothing to study");
            self.session = None;
            return Err(SessionError::EmptyPool(scope));
        }

        let wrong = words.iter().filter(|w| w.is_wrong()).count();
        tracing::info!(
            scope = %scope,
            cards = words.len(),
            wrong,
            daily_goal = settings.daily_goal,
            "session started"
        );

        Ok(&*self.session.insert(Session::new(scope, words)))
    }

    pub fn current_card(&self) -> Option<&Word> {
        self.session.as_ref().and_then(Session::current_card)
    }

    /// Toggle the current card; returns the new flip state
    pub fn flip(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.current_card().is_some() => {
                session.is_flipped = !session.is_flipped;
                session.is_flipped
            }
            _ => false,
        }
    }

    /// Record an answer for the current card and advance
    ///
    /// `Ok(None)` when there is no card to answer. The answer that finishes
    /// the session also appends the day's study log entry; if that write
    /// failed, the next call retries it before returning `Ok(None)`.
    pub fn answer(&mut self, correct: bool) -> Result<Option<AnswerOutcome>, SessionError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let Some(word_id) = session.current_card().map(|w| w.id.clone()) else {
            commit_study_log(&self.store, (self.today)(), session)?;
            return Ok(None);
        };

        let graduation_streak = self.store.get_settings()?.graduation_streak;
        let effect = store_answer(&self.store, &word_id, correct, graduation_streak)?;

        session.results.push(AnswerRecord { word_id, correct });
        session.is_flipped = false;
        session.current_index += 1;

        let total = session.words.len();
        let index = session.current_index;
        let done = index >= total;

        if done {
            commit_study_log(&self.store, (self.today)(), session)?;
        }

        Ok(Some(AnswerOutcome {
            done,
            index,
            total,
            effect,
        }))
    }

    /// Write the study log of a fully answered session still marked active
    ///
    /// Returns whether an entry was written.
    pub fn commit_pending(&mut self) -> Result<bool, SessionError> {
        match self.session.as_mut() {
            Some(session) => commit_study_log(&self.store, (self.today)(), session),
            None => Ok(false),
        }
    }

    pub fn progress(&self) -> Progress {
        self.session
            .as_ref()
            .map(Session::progress)
            .unwrap_or_default()
    }

    /// Tally of the answers recorded so far
    ///
    /// Missed words are re-read from the store so the summary shows their
    /// current counters; words deleted since are left out.
    pub fn session_result(&self) -> Result<Option<SessionSummary>, SessionError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(None);
        };

        let correct = session.results.iter().filter(|r| r.correct).count();
        let mut wrong_words = Vec::new();
        for record in session.results.iter().filter(|r| !r.correct) {
            if let Some(word) = self.store.get_word(&record.word_id)? {
                wrong_words.push(word);
            }
        }

        Ok(Some(SessionSummary {
            total: session.results.len(),
            correct,
            wrong: session.results.len() - correct,
            wrong_words,
            scope: session.scope.clone(),
        }))
    }

    /// Drop the current session without writing anything
    pub fn clear_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                scope = %session.scope,
                answered = session.results.len(),
                "session cleared"
            );
        }
    }
}

/// Append the day's entry once every card is answered, then mark completed
fn commit_study_log<S: QuizStore>(
    store: &S,
    date: NaiveDate,
    session: &mut Session,
) -> Result<bool, SessionError> {
    if session.state != SessionState::Active || session.current_index < session.words.len() {
        return Ok(false);
    }

    let count = u32::try_from(session.results.len()).unwrap_or(u32::MAX);
    let entry = store.append_study_log(date, count, &session.scope)?;
    session.state = SessionState::Completed;

    let correct_answers = session.results.iter().filter(|r| r.correct).count();
    tracing::info!(
        scope = %session.scope,
        total = session.words.len(),
        correct = correct_answers,
        day_total = entry.count,
        "session completed"
    );
    Ok(true)
}

/// Read-modify-write of one word's counters
///
/// Returns `None` when the word no longer exists.
fn store_answer<S: QuizStore>(
    store: &S,
    word_id: &str,
    correct: bool,
    graduation_streak: u32,
) -> Result<Option<AnswerEffect>, SessionError> {
    for attempt in 1..=MAX_COUNTER_RETRIES {
        let Some(word) = store.get_word(word_id)? else {
            tracing::warn!(word_id, "word deleted mid-session; answer not stored");
            return Ok(None);
        };

        let current = word.counters();
        let update = apply_answer(current, correct, graduation_streak);
        if store.update_word_counters(word_id, current, update.counters)? {
            tracing::debug!(
                word_id,
                correct,
                effect = ?update.effect,
                wrong_count = update.counters.wrong_count,
                correct_streak = update.counters.correct_streak,
                "answer stored"
            );
            return Ok(Some(update.effect));
        }

        tracing::debug!(word_id, attempt, "counters changed concurrently; retrying");
    }

    Err(StorageError::Conflict(format!(
        "word {word_id} kept changing during {MAX_COUNTER_RETRIES} update attempts"
    ))
    .into())
}
