//! FILENAME: core/table-source/src/source.rs
//! PURPOSE: The one external capability the engine consumes: a range read
//! against a named table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SourceError;

/// A bounded `[offset, offset + limit)` read against a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub table: String,
    /// Column projection. Empty means every column.
    pub columns: Vec<String>,
    pub offset: usize,
    pub limit: usize,
}

impl RangeRequest {
    pub fn new(table: &str, columns: &[String], offset: usize, limit: usize) -> Self {
        RangeRequest {
            table: table.to_string(),
            columns: columns.to_vec(),
            offset,
            limit,
        }
    }

    /// Inclusive index of the last row this request may return.
    /// None when `limit` is zero.
    pub fn last_index(&self) -> Option<usize> {
        self.limit.checked_sub(1).map(|span| self.offset + span)
    }

    /// Projection in `a,b,c` form, or `*` for every column.
    pub fn select_clause(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        }
    }
}

/// A tabular source that returns up to `limit` rows per call, in an order
/// that is stable across calls for a static table.
#[async_trait]
pub trait TableSource<R: Send>: Send + Sync {
    async fn read_range(&self, request: &RangeRequest) -> Result<Vec<R>, SourceError>;
}
