//! Errors raised at the boundary between the normalizer and its collaborators.
//!
//! The graph builder itself is total over any grid, so every variant here
//! belongs to loading the workbook or writing the documents.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for workbook loading and document writing
pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The workbook could not be opened or decoded into cells
    #[error("failed to read workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The requested worksheet does not exist
    #[error("sheet '{sheet}' not found in {path:?}; available sheets: {}", .available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    /// The workbook has no worksheets at all
    #[error("workbook {path:?} contains no sheets")]
    EmptyWorkbook { path: PathBuf },

    /// Reading or writing a file failed
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be encoded as JSON
    #[error("failed to encode JSON document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn workbook(path: &Path, message: impl ToString) -> Self {
        ConvertError::Workbook {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the failure came from the input side (malformed or missing source).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConvertError::Workbook { .. }
                | ConvertError::SheetNotFound { .. }
                | ConvertError::EmptyWorkbook { .. }
        )
    }
}
