//! Command line front end
//!
//! Commands write to any `Write` and the study loop reads answers from any
//! `BufRead`, so the whole surface runs against in-memory buffers in tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use thiserror::Error;

use wordcard_algo::{
    answers_to_graduation, validate_settings, DailySelector, Scope, Settings, Word, SCOPE_ALL,
    SCOPE_WRONG,
};

use crate::backup::{self, BackupError};
use crate::session::{SessionEngine, SessionError};
use crate::storage::{DatabaseManager, NewWord, StorageError, DEFAULT_CATEGORY_ID};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "wordcard", about = "Vocabulary flashcards with a daily quiz", version)]
pub struct Cli {
    /// Database file (overrides WORDCARD_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a word
    Add {
        source_text: String,
        translation: String,
        #[arg(long)]
        phonetic: Option<String>,
        /// Category name; created when missing
        #[arg(long)]
        category: Option<String>,
    },

    /// List words
    List {
        /// Only this category (name)
        #[arg(long)]
        category: Option<String>,
        /// Only words in the wrong pool
        #[arg(long)]
        wrong: bool,
    },

    /// Delete a word by id
    Remove { id: String },

    /// Take a word out of the wrong pool
    Reset { id: String },

    /// List or manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoryCommand>,
    },

    /// Run today's flip-card session
    Study {
        /// `all`, `wrong`, or a category name
        #[arg(long, default_value = SCOPE_ALL)]
        scope: String,
    },

    /// Study log summary
    Stats {
        /// Days of history to show
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Show or change study settings
    Settings {
        #[arg(long)]
        daily_goal: Option<u32>,
        #[arg(long)]
        graduation_streak: Option<u32>,
    },

    /// Write a full JSON snapshot
    ExportJson { path: PathBuf },

    /// Replace the library with a JSON snapshot
    ImportJson { path: PathBuf },

    /// Write all words as CSV
    ExportCsv { path: PathBuf },

    /// Append words from CSV
    ImportCsv { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add { name: String },
    Rename { name: String, new_name: String },
    /// Delete a category; its words move to the default category
    Delete { name: String },
}

/// Execute one command against an open database
pub fn run<R: BufRead, W: Write>(
    command: Command,
    db: &Arc<DatabaseManager>,
    seed: Option<u64>,
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    match command {
        Command::Add {
            source_text,
            translation,
            phonetic,
            category,
        } => {
            let category_id = match category {
                Some(name) => ensure_category(db, &name)?,
                None => DEFAULT_CATEGORY_ID.to_string(),
            };
            let mut new_word = NewWord::new(source_text, translation, category_id);
            new_word.phonetic = phonetic;
            let word = db.words().add_word(new_word)?;
            writeln!(out, "added {} ({})", word.source_text, word.id)?;
        }
        Command::List { category, wrong } => {
            let words = match category {
                Some(name) => {
                    let category_id = category_id_by_name(db, &name)?;
                    db.words().list_words_by_category(&category_id)?
                }
                None => db.words().list_words()?,
            };
            let graduation_streak = db.settings().get_settings()?.graduation_streak;
            for word in words.iter().filter(|w| !wrong || w.is_wrong()) {
                writeln!(out, "{}", describe_word(word, graduation_streak))?;
            }
        }
        Command::Remove { id } => {
            if !db.words().delete_word(&id)? {
                return Err(StorageError::NotFound(format!("word {id}")).into());
            }
            writeln!(out, "removed {id}")?;
        }
        Command::Reset { id } => {
            if !db.words().reset_counters(&id)? {
                return Err(StorageError::NotFound(format!("word {id}")).into());
            }
            writeln!(out, "reset {id}")?;
        }
        Command::Categories { action } => run_categories(action, db, out)?,
        Command::Study { scope } => {
            let scope = resolve_scope(db, &scope)?;
            let selector = match seed {
                Some(seed) => DailySelector::with_seed(seed),
                None => DailySelector::new(),
            };
            let mut engine = SessionEngine::with_selector(Arc::clone(db), selector);
            study(&mut engine, scope, input, out)?;
        }
        Command::Stats { days } => {
            let today = Local::now().date_naive();
            let log = db.study_log();
            writeln!(out, "total studied: {}", log.total_studied()?)?;
            writeln!(out, "current streak: {} day(s)", log.current_streak(today)?)?;
            let span = Duration::days(i64::from(days.max(1)) - 1);
            let from = today.checked_sub_signed(span).unwrap_or(NaiveDate::MIN);
            for entry in log.entries_between(from, today)? {
                writeln!(out, "{}  {:>4}  {}", entry.date, entry.count, entry.category_id)?;
            }
        }
        Command::Settings {
            daily_goal,
            graduation_streak,
        } => {
            let repo = db.settings();
            let mut settings = repo.get_settings()?;
            if daily_goal.is_some() || graduation_streak.is_some() {
                let requested = Settings {
                    daily_goal: daily_goal.unwrap_or(settings.daily_goal),
                    graduation_streak: graduation_streak.unwrap_or(settings.graduation_streak),
                };
                validate_settings(&requested).map_err(CliError::Usage)?;
                settings = repo.save_settings(requested)?;
            }
            writeln!(out, "daily goal: {}", settings.daily_goal)?;
            writeln!(out, "graduation streak: {}", settings.graduation_streak)?;
        }
        Command::ExportJson { path } => {
            let snapshot = backup::export_json_file(db, &path)?;
            writeln!(out, "exported {} words to {}", snapshot.words.len(), path.display())?;
        }
        Command::ImportJson { path } => {
            let report = backup::import_json_file(db, &path)?;
            writeln!(
                out,
                "restored {} words, {} categories, {} study log entries",
                report.words_imported, report.categories_created, report.study_log_entries
            )?;
        }
        Command::ExportCsv { path } => {
            let rows = backup::export_csv_file(db, &path)?;
            writeln!(out, "exported {rows} words to {}", path.display())?;
        }
        Command::ImportCsv { path } => {
            let report = backup::import_csv_file(db, &path)?;
            writeln!(
                out,
                "imported {} words ({} new categories, {} skipped, {} duplicates)",
                report.words_imported,
                report.categories_created,
                report.rows_skipped,
                report.duplicates
            )?;
        }
    }

    Ok(())
}

fn run_categories<W: Write>(
    action: Option<CategoryCommand>,
    db: &DatabaseManager,
    out: &mut W,
) -> CliResult<()> {
    let repo = db.categories();
    match action {
        None => {
            for category in repo.list_categories()? {
                let count = db.words().count_words_by_category(&category.id)?;
                let marker = if category.is_default { " (default)" } else { "" };
                writeln!(out, "{}{}  {} words", category.name, marker, count)?;
            }
        }
        Some(CategoryCommand::Add { name }) => {
            let category = repo.create_category(&name)?;
            writeln!(out, "created {}", category.name)?;
        }
        Some(CategoryCommand::Rename { name, new_name }) => {
            let id = category_id_by_name(db, &name)?;
            let category = repo.rename_category(&id, &new_name)?;
            writeln!(out, "renamed {name} to {}", category.name)?;
        }
        Some(CategoryCommand::Delete { name }) => {
            let id = category_id_by_name(db, &name)?;
            let moved = repo.delete_category(&id)?;
            writeln!(out, "deleted {name}; {moved} word(s) moved to the default category")?;
        }
    }
    Ok(())
}

/// Interactive flip-card loop
///
/// Per card: Enter flips, then `y`/`n` records the answer. `q` abandons the
/// session without writing the study log.
pub fn study<R: BufRead, W: Write>(
    engine: &mut SessionEngine<Arc<DatabaseManager>>,
    scope: Scope,
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    let total = engine.start_session(scope)?.len();
    writeln!(out, "{total} card(s) today")?;

    while let Some(card) = engine.current_card().cloned() {
        let progress = engine.progress();
        let phonetic = card
            .phonetic
            .as_deref()
            .map(|p| format!("  {p}"))
            .unwrap_or_default();
        writeln!(
            out,
            "[{}/{}] {}{}",
            progress.current + 1,
            progress.total,
            card.source_text,
            phonetic
        )?;
        write!(out, "(enter to flip, q to quit) ")?;
        out.flush()?;

        if is_quit(&read_line(input)?) {
            return abandon(engine, out);
        }
        engine.flip();
        writeln!(out, "  = {}", card.translation)?;

        let correct = loop {
            write!(out, "correct? [y/n/q] ")?;
            out.flush()?;
            let line = read_line(input)?;
            match line.as_deref().map(str::trim) {
                Some("y") | Some("Y") => break true,
                Some("n") | Some("N") => break false,
                _ if is_quit(&line) => return abandon(engine, out),
                _ => continue,
            }
        };
        engine.answer(correct)?;
    }

    if let Some(summary) = engine.session_result()? {
        writeln!(
            out,
            "done: {} correct, {} wrong of {}",
            summary.correct, summary.wrong, summary.total
        )?;
        for word in &summary.wrong_words {
            writeln!(out, "  review: {} = {}", word.source_text, word.translation)?;
        }
    }
    Ok(())
}

fn abandon<W: Write>(
    engine: &mut SessionEngine<Arc<DatabaseManager>>,
    out: &mut W,
) -> CliResult<()> {
    engine.clear_session();
    writeln!(out, "session abandoned")?;
    Ok(())
}

/// One `list` line; wrong words also show how many correct answers remain
fn describe_word(word: &Word, graduation_streak: u32) -> String {
    let phonetic = word
        .phonetic
        .as_deref()
        .map(|p| format!(" {p}"))
        .unwrap_or_default();
    let mut line = format!(
        "{}  {}{} = {}  [wrong {}, streak {}",
        word.id,
        word.source_text,
        phonetic,
        word.translation,
        word.wrong_count,
        word.correct_streak
    );
    let remaining = answers_to_graduation(word.counters(), graduation_streak);
    if remaining > 0 {
        line.push_str(&format!(", {remaining} to graduate"));
    }
    line.push(']');
    line
}

/// `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> CliResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn is_quit(line: &Option<String>) -> bool {
    match line {
        None => true,
        Some(line) => line.trim().eq_ignore_ascii_case("q"),
    }
}

/// `all`, `wrong`, a category name, or a category id
fn resolve_scope(db: &DatabaseManager, value: &str) -> CliResult<Scope> {
    let value = value.trim();
    if value == SCOPE_ALL || value == SCOPE_WRONG {
        return Ok(Scope::from(value));
    }
    if let Some(category) = db.categories().find_by_name(value)? {
        return Ok(Scope::Category(category.id));
    }
    if db.categories().get_category(value)?.is_some() {
        return Ok(Scope::Category(value.to_string()));
    }
    Err(CliError::Usage(format!("unknown scope '{value}'")))
}

fn category_id_by_name(db: &DatabaseManager, name: &str) -> CliResult<String> {
    db.categories()
        .find_by_name(name)?
        .map(|c| c.id)
        .ok_or_else(|| CliError::Usage(format!("no category named '{name}'")))
}

fn ensure_category(db: &DatabaseManager, name: &str) -> CliResult<String> {
    match db.categories().find_by_name(name)? {
        Some(category) => Ok(category.id),
        None => Ok(db.categories().create_category(name)?.id),
    }
}
