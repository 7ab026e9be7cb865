//! FILENAME: core/rollup-engine/src/context.rs
//! PURPOSE: Turns a rollup group or a single line item into the plain-text
//! block that seeds a chat prompt.
//! CONTEXT: The chat layer owns display; this module only fixes the content
//! and line order.

use fiscal::{format_compact, format_currency, format_percent};
use crate::aggregate::GroupAggregate;
use crate::definition::DetailRow;

/// Context block for one group: header lines, then up to `top_n` items.
///
/// ```text
/// Dataset: Capital Budget
/// Agency: Parks
/// Total: $1.2B
/// Items: 42
/// Share of total: 12.5%
/// Top items:
/// - Playground reconstruction: $45.0M
/// ```
pub fn build_group_context<T: DetailRow>(
    title: &str,
    group_label: &str,
    aggregate: &GroupAggregate,
    share: Option<f64>,
    details: &[T],
    top_n: usize,
) -> String {
    let mut lines = vec![
        format!("Dataset: {}", title),
        format!("{}: {}", group_label, aggregate.name),
        format!("Total: {}", format_compact(aggregate.total_amount)),
        format!("Items: {}", aggregate.count),
    ];

    if let Some(share) = share {
        lines.push(format!("Share of total: {}", format_percent(share)));
    }

    let top: Vec<&T> = details.iter().take(top_n).collect();
    if !top.is_empty() {
        lines.push("Top items:".to_string());
        for item in top {
            lines.push(format!("- {}: {}", item.label(), format_compact(item.primary_amount())));
        }
    }

    lines.join("\n")
}

/// Context block for one line item within `group`.
pub fn build_detail_context<T: DetailRow>(
    title: &str,
    group_label: &str,
    group: &str,
    detail: &T,
) -> String {
    let mut lines = vec![
        format!("Dataset: {}", title),
        format!("{}: {}", group_label, group),
        format!("Item: {}", detail.label()),
        format!("Amount: {}", format_currency(detail.primary_amount())),
    ];

    for (name, value) in detail.context_fields() {
        if !value.is_empty() {
            lines.push(format!("{}: {}", name, value));
        }
    }

    lines.join("\n")
}
