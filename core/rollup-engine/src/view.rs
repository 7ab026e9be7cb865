//! FILENAME: core/rollup-engine/src/view.rs
//! Rollup View - renderable output for the presentation layer.
//!
//! A flat, serializable snapshot of the rollup table with display strings
//! already formatted, so the UI does not need to know the formatting rules.

use fiscal::{format_compact, format_percent};
use serde::{Deserialize, Serialize};
use crate::aggregate::AggregationIndex;
use crate::definition::DatasetDefinition;
use crate::engine::LoadStatus;

/// One rendered row of the rollup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRowView {
    pub name: String,
    pub count: usize,
    pub total_amount: f64,
    pub total_display: String,
    pub share_of_total: f64,
    pub share_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupView {
    pub dataset_id: String,
    pub title: String,
    pub group_label: String,
    pub status: LoadStatus,
    pub groups: Vec<GroupRowView>,
    pub grand_total: f64,
    pub grand_total_display: String,
    pub total_items: usize,
}

impl RollupView {
    pub fn build(definition: &DatasetDefinition, status: LoadStatus, index: &AggregationIndex) -> Self {
        let grand_total = index.grand_total();
        let groups = index
            .groups()
            .iter()
            .map(|g| {
                let share = if grand_total == 0.0 {
                    0.0
                } else {
                    g.total_amount / grand_total
                };
                GroupRowView {
                    name: g.name.to_string(),
                    count: g.count,
                    total_amount: g.total_amount,
                    total_display: format_compact(g.total_amount),
                    share_of_total: share,
                    share_display: format_percent(share),
                }
            })
            .collect();

        RollupView {
            dataset_id: definition.id.clone(),
            title: definition.title.clone(),
            group_label: definition.group_label.clone(),
            status,
            groups,
            grand_total,
            grand_total_display: format_compact(grand_total),
            total_items: index.total_item_count(),
        }
    }

    /// Rows `[start, start + count)` of the rollup table, for virtualized lists.
    pub fn window(&self, start: usize, count: usize) -> &[GroupRowView] {
        let start = start.min(self.groups.len());
        let end = start.saturating_add(count).min(self.groups.len());
        &self.groups[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_view_while_loading() {
        let definition = DatasetDefinition::new("capital", "Capital Budget", "capital_items", "Agency");
        let view = RollupView::build(&definition, LoadStatus::Loading, &AggregationIndex::empty());

        assert!(view.groups.is_empty());
        assert_eq!(view.grand_total_display, "$0");
        assert_eq!(view.window(0, 10).len(), 0);
    }

    #[test]
    fn test_status_serializes_tagged() {
        let ready = serde_json::to_value(LoadStatus::Ready { row_count: 3 }).unwrap();
        assert_eq!(ready, serde_json::json!({"state": "ready", "rowCount": 3}));

        let failed = serde_json::to_value(LoadStatus::Failed { reason: "boom".to_string() }).unwrap();
        assert_eq!(failed, serde_json::json!({"state": "failed", "reason": "boom"}));
    }
}
