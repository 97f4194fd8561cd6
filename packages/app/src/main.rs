use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use wordcard::cli::{self, Cli};
use wordcard::config::Config;
use wordcard::logging;
use wordcard::storage::DatabaseManager;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let cli = Cli::parse();
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());

    let db = match DatabaseManager::new(&db_path) {
        Ok(db) => Arc::new(db),
        Err(err) => {
            tracing::error!(path = %db_path.display(), error = %err, "failed to open database");
            eprintln!("error: cannot open {}: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();

    let result = cli::run(cli.command, &db, config.seed, &mut input, &mut out);
    let _ = out.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
