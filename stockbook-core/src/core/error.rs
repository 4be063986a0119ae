//! Error types for the Stockbook core library.

use thiserror::Error;

use crate::core::export::ExportError;

/// All errors that can occur within the Stockbook core library.
#[derive(Debug, Error)]
pub enum StockbookError {
    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted record file does not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A navigation or deletion index lies outside the collection.
    #[error("Index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    /// Navigation tried to move past the first or last record.
    #[error("Boundary reached: {0}")]
    Boundary(String),

    /// Required input was missing when trying to save a record.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Rendering or writing an export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl From<csv::Error> for StockbookError {
    fn from(err: csv::Error) -> Self {
        // An I/O failure underneath the reader is still an I/O failure.
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => return Self::Io(io),
                other => return Self::Parse(format!("{other:?}")),
            }
        }
        Self::Parse(err.to_string())
    }
}

impl From<tempfile::PersistError> for StockbookError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

/// Convenience alias that pins the error type to [`StockbookError`].
pub type Result<T> = std::result::Result<T, StockbookError>;

impl StockbookError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("File error: {e}"),
            Self::Parse(e) => format!("The record file is damaged: {e}"),
            Self::IndexOutOfRange { .. } => "No record to show.".to_string(),
            Self::Boundary(msg) => msg.clone(),
            Self::ValidationFailed(msg) => msg.clone(),
            Self::Export(e) => e.user_message(),
        }
    }
}
