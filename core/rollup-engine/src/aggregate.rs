//! FILENAME: core/rollup-engine/src/aggregate.rs
//! Aggregation Index - one pass over the loaded rows.
//!
//! The index is designed for:
//! - A single O(n) build per loaded row set
//! - Deterministic output: accumulation in first-seen order, stable sort
//! - O(group size) drill-downs via the per-group row index
//!
//! Grand total and item count are summed from the aggregate table, never
//! re-scanned from the rows, so the table and the totals cannot disagree.

use std::time::Instant;

use fiscal::log_debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::definition::{Dataset, GroupKey};

// ============================================================================
// GROUP AGGREGATE
// ============================================================================

/// One row of the rollup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAggregate {
    pub name: GroupKey,
    pub count: usize,
    pub total_amount: f64,
}

impl GroupAggregate {
    pub fn new(name: GroupKey, count: usize, total_amount: f64) -> Self {
        GroupAggregate {
            name,
            count,
            total_amount,
        }
    }
}

/// Running state for one group during the build.
#[derive(Debug, Default)]
struct GroupAccumulator {
    count: usize,
    total: f64,
    members: Vec<usize>,
}

impl GroupAccumulator {
    fn add(&mut self, row_index: usize, amount: f64) {
        self.count += 1;
        self.total += amount;
        self.members.push(row_index);
    }
}

/// Statistics about the index build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub groups: usize,
    pub rows: usize,
    pub build_time_ms: u64,
}

// ============================================================================
// AGGREGATION INDEX
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AggregationIndex {
    /// Sorted descending by total amount.
    groups: Vec<GroupAggregate>,

    /// Row indices per group, parallel to `groups`, in source order.
    members: Vec<Vec<usize>>,

    /// Group key -> position in `groups`.
    positions: FxHashMap<GroupKey, usize>,

    grand_total: f64,
    total_items: usize,
    stats: IndexStats,
}

impl AggregationIndex {
    /// Creates an empty index (nothing loaded).
    pub fn empty() -> Self {
        AggregationIndex::default()
    }

    /// Builds the index in a single pass over `rows`.
    pub fn build<D: Dataset>(rows: &[D::Row], dataset: &D) -> Self {
        let started = Instant::now();

        let mut slots: FxHashMap<GroupKey, usize> = FxHashMap::default();
        let mut accumulators: Vec<(GroupKey, GroupAccumulator)> = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let key = dataset.group_key(row);
            let amount = dataset.amount(row);

            let slot = *slots.entry(key).or_insert_with_key(|key| {
                accumulators.push((key.clone(), GroupAccumulator::default()));
                accumulators.len() - 1
            });
            accumulators[slot].1.add(row_index, amount);
        }

        // sort_by is stable: equal totals keep first-seen order
        accumulators.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));

        let mut groups = Vec::with_capacity(accumulators.len());
        let mut members = Vec::with_capacity(accumulators.len());
        let mut positions = FxHashMap::default();
        positions.reserve(accumulators.len());

        for (position, (key, acc)) in accumulators.into_iter().enumerate() {
            positions.insert(key.clone(), position);
            groups.push(GroupAggregate::new(key, acc.count, acc.total));
            members.push(acc.members);
        }

        let grand_total = groups.iter().map(|g| g.total_amount).sum();
        let total_items = groups.iter().map(|g| g.count).sum();

        let stats = IndexStats {
            groups: groups.len(),
            rows: rows.len(),
            build_time_ms: started.elapsed().as_millis() as u64,
        };
        log_debug!("AGG", "dataset={} groups={} rows={}", dataset.definition().id, stats.groups, stats.rows);

        AggregationIndex {
            groups,
            members,
            positions,
            grand_total,
            total_items,
            stats,
        }
    }

    /// The rollup table, sorted descending by total amount.
    pub fn groups(&self) -> &[GroupAggregate] {
        &self.groups
    }

    pub fn get(&self, key: &str) -> Option<&GroupAggregate> {
        self.positions.get(key).map(|&p| &self.groups[p])
    }

    /// Row indices (into the loaded row set) belonging to `key`, in source order.
    pub fn members(&self, key: &str) -> Option<&[usize]> {
        self.positions.get(key).map(|&p| self.members[p].as_slice())
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    pub fn total_item_count(&self) -> usize {
        self.total_items
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Fraction of the grand total held by `key`. Zero when the grand total is zero.
    pub fn share_of_total(&self, key: &str) -> Option<f64> {
        let group = self.get(key)?;
        if self.grand_total == 0.0 {
            Some(0.0)
        } else {
            Some(group.total_amount / self.grand_total)
        }
    }

    /// Top `top_n` groups followed by one "Other" bucket folding the rest.
    /// Counts and totals of the series sum to the full table, and no name
    /// appears twice: a real "Other" group in the top `n` absorbs the bucket.
    pub fn chart_series(&self, top_n: usize) -> Vec<GroupAggregate> {
        if self.groups.len() <= top_n {
            return self.groups.clone();
        }

        let (head, tail) = self.groups.split_at(top_n);
        let mut series = head.to_vec();
        let other = tail.iter().fold(
            GroupAggregate::new(GroupKey::other(), 0, 0.0),
            |mut acc, g| {
                acc.count += g.count;
                acc.total_amount += g.total_amount;
                acc
            },
        );
        match series.iter_mut().find(|g| g.name == other.name) {
            Some(existing) => {
                existing.count += other.count;
                existing.total_amount += other.total_amount;
            }
            None => series.push(other),
        }
        series
    }
}
