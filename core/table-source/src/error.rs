//! FILENAME: core/table-source/src/error.rs

use thiserror::Error;

/// Failure of a single range read.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a full-table load. Any of these aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Page at offset {offset} failed after {attempts} attempt(s): {source}")]
    Page {
        offset: usize,
        attempts: u32,
        #[source]
        source: SourceError,
    },

    #[error("Page at offset {offset} timed out after {attempts} attempt(s)")]
    Timeout { offset: usize, attempts: u32 },

    #[error("Load cancelled at offset {offset}")]
    Cancelled { offset: usize },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,
}

impl LoadError {
    /// Offset of the page that stopped the load, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            LoadError::Page { offset, .. }
            | LoadError::Timeout { offset, .. }
            | LoadError::Cancelled { offset } => Some(*offset),
            LoadError::InvalidPageSize => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled { .. })
    }
}
