use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type covering the failures that halt a merge batch.
///
/// Per-file problems ([`LoadError`], [`NormalizeError`], empty tables) never
/// surface here; the orchestrator turns them into status events instead.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Wrapper for IO failures such as reading directories.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when an options document cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the input directory does not exist.
    #[error("input directory not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the discovery glob pattern is malformed.
    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when the input directory holds no spreadsheet at all.
    #[error("no spreadsheet files found in {0}")]
    NoInputFiles(PathBuf),

    /// Raised when every discovered file failed to load or was empty.
    #[error("none of the {attempted} file(s) in {directory} could be read")]
    BatchEmpty { directory: PathBuf, attempted: usize },

    /// Raised when the merged workbook cannot be written. The merged data is
    /// discarded.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Raised when a batch is requested while another one is running.
    #[error("a merge batch is already in progress")]
    BatchInProgress,

    /// Raised when the batch worker thread panicked.
    #[error("merge worker terminated unexpectedly")]
    WorkerPanicked,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// A file that could not be read as either supported spreadsheet format.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} is not a readable spreadsheet (xlsx: {modern}; xls: {legacy})", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    /// Reason reported by the modern (zip/xml) reader.
    pub modern: String,
    /// Reason reported by the legacy (binary) reader.
    pub legacy: String,
}

/// Raised when a single table cannot be widened to the unified schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// Two columns of the table share a label once trimmed.
    #[error("column '{label}' appears more than once")]
    DuplicateLabel { label: String },

    /// A column does not hold exactly one value per row.
    #[error("column '{label}' has {actual} value(s) but the table has {expected} row(s)")]
    RaggedColumn {
        label: String,
        expected: usize,
        actual: usize,
    },
}
