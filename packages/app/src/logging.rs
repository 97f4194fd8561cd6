use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "wordcard.log";

/// Flushes the file writer on drop; hold it until `main` returns
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// `LOG_DIR` (default `./logs`) when `ENABLE_FILE_LOGS` is `true` or `1`
pub fn file_log_dir() -> Option<PathBuf> {
    let enabled = std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    enabled.then(|| {
        std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"))
    })
}

/// Install the global subscriber
///
/// Console events go to stderr so they never interleave with command output
/// on stdout. File events roll over daily.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let mut guard = None;
    let file_layer = file_log_dir().and_then(|dir| match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(FileLogGuard {
                _guard: worker_guard,
            });
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        }
        Err(err) => {
            eprintln!("failed to create log directory {}: {err}", dir.display());
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
