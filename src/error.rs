// Error taxonomy for the import pipeline.
//
// Only conditions that abort work are errors. Per-row problems (bad date,
// unparseable rank) are counted in the run summary instead - see report.rs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    /// Source file missing, unreadable, or structurally broken. Fatal.
    #[error("cannot read source {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    /// A required column is absent from a sheet or file. The enclosing
    /// sheet/file is skipped whole; fatal only when nothing remains.
    #[error("source '{source_name}' is missing columns: {missing:?}")]
    SchemaMismatch {
        // Not named `source` because thiserror would treat that as the
        // error-source field, and String does not implement Error.
        source_name: String,
        missing: Vec<String>,
    },

    /// The whole run produced no loadable rows.
    #[error("no data produced from {context}")]
    NoData { context: String },

    /// A normalized record failed validation against the declared table
    /// schema. Indicates a pipeline bug, not bad input; fatal.
    #[error("record failed {table} validation: {reason}")]
    Validation { table: &'static str, reason: String },

    /// Transaction failure against the destination store. Fatal, and the
    /// destination table is left in its pre-run state.
    #[error("store write failed: {0}")]
    StoreWrite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Process exit status for this error. Distinct codes so automation can
    /// tell "no data produced" (2) from "bad store" (5).
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::SourceRead { .. } => 1,
            ImportError::SchemaMismatch { .. } => 1,
            ImportError::NoData { .. } => 2,
            ImportError::Validation { .. } => 1,
            ImportError::StoreWrite(_) => 5,
            ImportError::Csv(_) => 1,
            ImportError::Io(_) => 1,
        }
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
