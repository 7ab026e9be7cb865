//! FILENAME: core/rollup-engine/src/definition.rs
//! Dataset Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a rollup dataset:
//! - `DatasetDefinition`: where the rows live and how they are presented
//! - `Dataset`: how a raw row maps to a group key, an amount and a detail row
//! - `GroupKey`: the normalized value rows are grouped by

use std::borrow::Borrow;
use std::fmt;

use fiscal::AmountUnit;
use serde::{Deserialize, Serialize};

/// Label for rows whose group column is absent or blank.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Label for the bucket that folds the tail of a chart series.
pub const OTHER_GROUP: &str = "Other";

// ============================================================================
// GROUP KEY
// ============================================================================

/// The value rows are aggregated by (agency, fund group, ...).
/// Case-sensitive and otherwise verbatim: "Parks" and "PARKS" are two groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Absent or whitespace-only values become `"Unknown"`.
    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => GroupKey(v.to_string()),
            _ => GroupKey(UNKNOWN_GROUP.to_string()),
        }
    }

    pub fn other() -> Self {
        GroupKey(OTHER_GROUP.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey(value.to_string())
    }
}

impl Borrow<str> for GroupKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for GroupKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GroupKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// DATASET DEFINITION
// ============================================================================

fn default_context_top_n() -> usize {
    10
}

fn default_chart_top_n() -> usize {
    8
}

/// Describes one dashboard dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDefinition {
    /// Stable identifier ("capital", "discretionary", "revenue").
    pub id: String,

    /// Display title.
    pub title: String,

    /// Table or view the rows are read from.
    pub table: String,

    /// Column projection for range reads. Empty selects every column.
    #[serde(default)]
    pub columns: Vec<String>,

    /// What a group key names ("Agency", "Fund group").
    pub group_label: String,

    /// Unit the source stores amounts in.
    #[serde(default)]
    pub amount_unit: AmountUnit,

    /// Detail rows listed in a chat context block.
    #[serde(default = "default_context_top_n")]
    pub context_top_n: usize,

    /// Groups shown before the "Other" bucket in the summary chart.
    #[serde(default = "default_chart_top_n")]
    pub chart_top_n: usize,
}

impl DatasetDefinition {
    pub fn new(id: &str, title: &str, table: &str, group_label: &str) -> Self {
        DatasetDefinition {
            id: id.to_string(),
            title: title.to_string(),
            table: table.to_string(),
            columns: Vec::new(),
            group_label: group_label.to_string(),
            amount_unit: AmountUnit::Units,
            context_top_n: default_context_top_n(),
            chart_top_n: default_chart_top_n(),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_amount_unit(mut self, unit: AmountUnit) -> Self {
        self.amount_unit = unit;
        self
    }
}

// ============================================================================
// DATASET BEHAVIOR
// ============================================================================

/// A projected line item shown when a group is expanded.
pub trait DetailRow {
    /// Description or program label.
    fn label(&self) -> &str;

    /// The amount detail lists are sorted by (descending).
    fn primary_amount(&self) -> f64;

    /// Extra `(name, value)` pairs for a single-item chat context.
    fn context_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Binds a raw row type to its grouping, amount and detail projection.
/// One implementation per dataset; the engine itself is generic.
pub trait Dataset: Send + Sync + 'static {
    type Row: Send + Sync + 'static;
    type Detail: DetailRow + Clone + Send + Sync + 'static;

    fn definition(&self) -> &DatasetDefinition;

    fn group_key(&self, row: &Self::Row) -> GroupKey;

    fn amount(&self, row: &Self::Row) -> f64;

    fn to_detail(&self, row: &Self::Row) -> Self::Detail;
}
