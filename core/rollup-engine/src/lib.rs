//! FILENAME: core/rollup-engine/src/lib.rs
//! Rollup subsystem for the fiscal dashboards.
//!
//! Loads a flat dataset once, rolls it up by a group key and serves lazily
//! computed, cached drill-downs. One generic engine backs every dataset.
//!
//! Layers:
//! - `definition`: Serializable configuration (what a dataset IS)
//! - `aggregate`: Aggregation index (HOW we roll up)
//! - `drill`: Compute-once drill-down cache
//! - `engine`: The per-dashboard instance and its query surface
//! - `context`: Chat prompt text
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `datasets`: Capital, discretionary and revenue instantiations
//! - `config`: JSON/env configuration

pub mod aggregate;
pub mod config;
pub mod context;
pub mod datasets;
pub mod definition;
pub mod drill;
pub mod engine;
mod error;
pub mod view;

pub use aggregate::{AggregationIndex, GroupAggregate, IndexStats};
pub use config::DashboardConfig;
pub use context::{build_detail_context, build_group_context};
pub use datasets::{
    CapitalDataset, CapitalDetail, DiscretionaryDataset, GrantDetail, RevenueDataset, RevenueDetail,
};
pub use definition::{Dataset, DatasetDefinition, DetailRow, GroupKey, OTHER_GROUP, UNKNOWN_GROUP};
pub use drill::DrillCache;
pub use engine::{ContextSubject, LoadStatus, RollupEngine};
pub use error::{ConfigError, EngineError};
pub use view::{GroupRowView, RollupView};
