//! Errors raised while turning a tabular source into an inventory dataset

use thiserror::Error;

/// Loader errors. All of them are fatal for the source being loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to read source {path}: {message}")]
    SourceRead { path: String, message: String },

    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Invalid number {value:?} in column '{column}' at row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Value out of range in column '{column}' at row {row}")]
    ValueOverflow { row: usize, column: String },
}

impl LoadError {
    pub fn source_read(path: impl Into<String>, message: impl ToString) -> Self {
        LoadError::SourceRead {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::SourceRead { .. } => "SOURCE_READ_ERROR",
            LoadError::MissingColumns { .. } => "MISSING_COLUMNS",
            LoadError::InvalidNumber { .. } => "INVALID_NUMBER",
            LoadError::ValueOverflow { .. } => "VALUE_OVERFLOW",
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
