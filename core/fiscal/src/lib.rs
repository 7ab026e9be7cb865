//! FILENAME: core/fiscal/src/lib.rs
//! PURPOSE: Shared leaf types for the fiscal dashboard engine.
//! CONTEXT: Row shapes, amount parsing and currency formatting used by both
//! the table-source and rollup-engine crates. No I/O lives here.

pub mod amount;
pub mod logging;
pub mod number_format;
pub mod rows;

pub use amount::{parse_amount, AmountParser, AmountUnit, RawAmount};
pub use number_format::{format_compact, format_currency, format_percent};
pub use rows::{CapitalItem, GrantRecord, RevenueLine};
