// ❗ Error Types - load failures vs. analysis preconditions
//
// Loading and analysing are separate failure domains: a file that cannot be
// decoded never reaches the engine, and the engine never reports decode
// problems.

use std::path::PathBuf;

/// Failure to turn an external file or payload into a record set.
///
/// Every variant renders as "could not load data ..." so callers can show it
/// as its own state instead of an analysis answer.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not load data from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load data: CSV decode failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not load data: JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not load data: {0}")]
    InvalidShape(String),

    #[error("could not load data: unsupported file type {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Precondition failures raised by the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Per-record analyses divide by the record count.
    #[error("no budget records loaded: upload a file before asking about budgets")]
    EmptyRecordSet,
}
