//! FILENAME: core/table-source/src/lib.rs
//! Table Source subsystem.
//!
//! Everything that talks to the backing tabular store lives here:
//! - `source`: the range-read contract (`TableSource`)
//! - `memory`: an in-process table behind that contract
//! - `http`: a PostgREST-style REST implementation
//! - `loader`: full-table loading by sequential pages
//!
//! Rows are opaque to this crate; it never interprets a column.

mod error;
pub mod http;
pub mod loader;
pub mod memory;
pub mod source;

pub use error::{LoadError, SourceError};
pub use http::{HttpSource, HttpSourceConfig};
pub use loader::{LoadReport, LoaderConfig, PaginatedLoader, DEFAULT_PAGE_SIZE};
pub use memory::MemorySource;
pub use source::{RangeRequest, TableSource};

// Callers need the token type to cancel a load.
pub use tokio_util::sync::CancellationToken;
