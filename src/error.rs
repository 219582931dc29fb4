use std::path::PathBuf;

use thiserror::Error;

use crate::types::{EntityTable, ExtractionSummary};

/// Convenience result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Top-level error type returned by the probe/extract/persist pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Schema-level failure; no extraction was attempted.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Mid-stream failure; carries partial results.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Failure while persisting output artifacts.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Fatal error raised before any row is extracted: the file cannot be probed,
/// or a selection/filter names a column the inventory does not contain.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text decoding error while reading the header or sample.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is empty or its header row could not be parsed.
    #[error("empty input: no header row in '{}'", .path.display())]
    EmptyInput { path: PathBuf },

    /// A selection or filter referenced a column that is not in the inventory.
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },

    /// Auto-selection found no entity-key candidate among the columns.
    #[error("no entity-key candidate column in inventory")]
    NoEntityKey,
}

/// Fatal mid-stream failure.
///
/// Extraction aborts, but the entity table and summary built so far travel on
/// the error so callers can decide whether partial results are worth keeping.
#[derive(Debug, Error)]
#[error("extraction aborted after {rows_seen} rows: {cause}")]
pub struct StreamError {
    /// What ended the run.
    #[source]
    pub cause: StreamCause,
    /// Data rows read before the abort.
    pub rows_seen: u64,
    /// Entity table built so far, already frozen.
    pub partial: EntityTable,
    /// Summary of the run up to the abort.
    pub summary: ExtractionSummary,
}

/// Why a stream aborted.
#[derive(Debug, Error)]
pub enum StreamCause {
    /// I/O or decoding failure from the underlying reader.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The caller's cancellation flag was set; observed at a chunk boundary.
    #[error("cancelled at chunk boundary")]
    Cancelled,
}

/// Error while writing output artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
