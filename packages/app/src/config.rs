use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "wordcard.db";

/// Process configuration read from the environment
///
/// Study settings (daily goal, graduation streak) are user data and live in
/// the database instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Fixed shuffle seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("WORDCARD_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let seed = lookup("WORDCARD_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        Self {
            db_path,
            log_level,
            seed,
        }
    }
}
