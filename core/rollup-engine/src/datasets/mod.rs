//! FILENAME: core/rollup-engine/src/datasets/mod.rs
//! The three dashboard datasets. Each one only supplies row mapping and a
//! default definition; loading, aggregation and caching are shared.

pub mod capital;
pub mod discretionary;
pub mod revenue;

pub use capital::{CapitalDataset, CapitalDetail};
pub use discretionary::{DiscretionaryDataset, GrantDetail};
pub use revenue::{RevenueDataset, RevenueDetail};

/// Trimmed text, or `fallback` when absent or blank.
fn text_or(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}
