//! Backup and restore
//!
//! - [`snapshot`]: full-library JSON snapshots (replace on import)
//! - [`word_list`]: CSV word lists (append on import)

pub mod snapshot;
pub mod word_list;

pub use snapshot::{
    export_json_file, export_snapshot, import_json_file, import_snapshot, validate_snapshot,
    LibrarySnapshot, SNAPSHOT_FORMAT_VERSION,
};
pub use word_list::{export_csv, export_csv_file, import_csv, import_csv_file, CsvWordRow};

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid backup: {0}")]
    Invalid(String),
}

pub type BackupResult<T> = Result<T, BackupError>;

/// Counts reported after an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub words_imported: usize,
    pub categories_created: usize,
    /// Rows with missing text or that failed to parse
    pub rows_skipped: usize,
    /// Rows matching a word already in the same category
    pub duplicates: usize,
    pub study_log_entries: usize,
}
