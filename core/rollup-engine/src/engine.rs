//! FILENAME: core/rollup-engine/src/engine.rs
//! Rollup Engine - one instance per open dashboard.
//!
//! Lifecycle:
//! 1. `new` with a dataset (its definition and row mapping)
//! 2. `load` once: paginated read of the whole table, then one aggregation pass
//! 3. Query: rollup table, totals, drill-downs, chat context
//!
//! The loaded rows and their index are written exactly once and only after
//! the load succeeds, so readers see either nothing or the complete table.
//! The drill cache is the only state that changes after load.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use fiscal::{log_debug, log_enter, log_error, log_exit, log_info, log_warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use table_source::{CancellationToken, LoadReport, PaginatedLoader, TableSource};
use crate::aggregate::{AggregationIndex, GroupAggregate, IndexStats};
use crate::context::{build_detail_context, build_group_context};
use crate::definition::{Dataset, DatasetDefinition, DetailRow, GroupKey};
use crate::drill::DrillCache;
use crate::error::EngineError;
use crate::view::RollupView;

// ============================================================================
// LOAD STATUS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadStatus {
    Loading,
    #[serde(rename_all = "camelCase")]
    Ready { row_count: usize },
    Failed { reason: String },
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}

/// What a chat context is built for.
pub enum ContextSubject<'a, T> {
    /// A rollup row, by group name.
    Group(&'a str),
    /// One line item and the group it belongs to.
    Detail { group: &'a str, detail: &'a T },
}

/// The immutable result of a successful load.
struct LoadedData<R> {
    rows: Vec<R>,
    index: AggregationIndex,
}

/// Marks the engine `Failed` if a `load` future is dropped mid-flight
/// (caller timeout, task abort), so the status cannot stay `Loading`.
struct AbandonGuard<'a, D: Dataset> {
    engine: &'a RollupEngine<D>,
    armed: bool,
}

impl<D: Dataset> AbandonGuard<'_, D> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<D: Dataset> Drop for AbandonGuard<'_, D> {
    fn drop(&mut self) {
        if self.armed {
            log_warn!("LOAD", "dataset={} load abandoned", self.engine.definition().id);
            self.engine.set_status(LoadStatus::Failed {
                reason: ABANDONED_REASON.to_string(),
            });
        }
    }
}

const ABANDONED_REASON: &str = "load abandoned";

// ============================================================================
// ENGINE
// ============================================================================

pub struct RollupEngine<D: Dataset> {
    dataset: D,
    status: RwLock<LoadStatus>,
    started: AtomicBool,
    loaded: OnceCell<LoadedData<D::Row>>,
    drill: DrillCache<D::Detail>,
}

impl<D: Dataset> RollupEngine<D> {
    pub fn new(dataset: D) -> Self {
        RollupEngine {
            dataset,
            status: RwLock::new(LoadStatus::Loading),
            started: AtomicBool::new(false),
            loaded: OnceCell::new(),
            drill: DrillCache::new(),
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn definition(&self) -> &DatasetDefinition {
        self.dataset.definition()
    }

    fn set_status(&self, status: LoadStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn begin(&self) -> Result<(), EngineError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyLoaded);
        }
        Ok(())
    }

    /// Reads the whole table through `loader` and builds the index.
    /// Runs at most once per engine; a failed or abandoned load leaves the
    /// engine `Failed`.
    pub async fn load<S>(
        &self,
        source: &S,
        loader: &PaginatedLoader,
        cancel: &CancellationToken,
    ) -> Result<LoadReport, EngineError>
    where
        S: TableSource<D::Row> + ?Sized,
    {
        self.begin()?;
        let definition = self.dataset.definition();
        log_enter!("LOAD", "load", "dataset={} table={}", definition.id, definition.table);

        let guard = AbandonGuard { engine: self, armed: true };
        let outcome = loader.load(source, &definition.table, &definition.columns, cancel).await;
        guard.disarm();

        match outcome {
            Ok((rows, report)) => {
                self.install(rows);
                log_exit!("LOAD", "load", "dataset={} rows={}", definition.id, report.rows);
                Ok(report)
            }
            Err(err) => {
                log_error!("LOAD", "dataset={} failed: {}", definition.id, err);
                self.set_status(LoadStatus::Failed {
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Installs rows that were obtained elsewhere (fixtures, offline snapshots).
    pub fn load_rows(&self, rows: Vec<D::Row>) -> Result<(), EngineError> {
        self.begin()?;
        self.install(rows);
        Ok(())
    }

    fn install(&self, rows: Vec<D::Row>) {
        let index = AggregationIndex::build(&rows, &self.dataset);
        let row_count = rows.len();
        // Data and status are published under one write lock so `snapshot`
        // never pairs `Loading` with a filled table
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        // `begin` guarantees a single writer, so the cell is always empty here
        let _ = self.loaded.set(LoadedData { rows, index });
        *status = LoadStatus::Ready { row_count };
        drop(status);
        log_info!("AGG", "dataset={} ready rows={}", self.dataset.definition().id, row_count);
    }

    // ------------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------------

    pub fn status(&self) -> LoadStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Loaded rows in source order. Empty until ready.
    pub fn rows(&self) -> &[D::Row] {
        self.loaded.get().map(|d| d.rows.as_slice()).unwrap_or(&[])
    }

    /// Rollup table, sorted descending by total. Empty until ready.
    pub fn aggregates(&self) -> &[GroupAggregate] {
        self.loaded.get().map(|d| d.index.groups()).unwrap_or(&[])
    }

    pub fn aggregate(&self, group: &str) -> Option<&GroupAggregate> {
        self.loaded.get()?.index.get(group)
    }

    pub fn grand_total(&self) -> f64 {
        self.loaded.get().map(|d| d.index.grand_total()).unwrap_or(0.0)
    }

    pub fn total_item_count(&self) -> usize {
        self.loaded.get().map(|d| d.index.total_item_count()).unwrap_or(0)
    }

    pub fn share_of_total(&self, group: &str) -> Option<f64> {
        self.loaded.get()?.index.share_of_total(group)
    }

    pub fn index_stats(&self) -> Option<&IndexStats> {
        self.loaded.get().map(|d| d.index.stats())
    }

    /// Summary chart series using the definition's `chart_top_n`.
    pub fn chart_series(&self) -> Vec<GroupAggregate> {
        self.loaded
            .get()
            .map(|d| d.index.chart_series(self.definition().chart_top_n))
            .unwrap_or_default()
    }

    /// Raw rows belonging to `group`, in source order.
    pub fn rows_for<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a D::Row> + 'a {
        let (rows, members): (&[D::Row], &[usize]) = match self.loaded.get() {
            Some(data) => (&data.rows, data.index.members(group).unwrap_or(&[])),
            None => (&[], &[]),
        };
        members.iter().map(move |&i| &rows[i])
    }

    /// Detail rows for `group`, sorted descending by primary amount.
    ///
    /// Computed on first request and cached for the engine's lifetime. Never
    /// fails: returns an empty list before the load completes, after a failed
    /// load, or for a group that does not exist.
    pub fn drill_down(&self, group: &str) -> Arc<Vec<D::Detail>> {
        let Some(data) = self.loaded.get() else {
            return Arc::new(Vec::new());
        };
        let Some(members) = data.index.members(group) else {
            return Arc::new(Vec::new());
        };

        self.drill.get_or_compute(group, || {
            log_debug!("DRILL", "dataset={} group={} rows={}", self.definition().id, group, members.len());
            let mut details: Vec<D::Detail> = members
                .iter()
                .map(|&i| self.dataset.to_detail(&data.rows[i]))
                .collect();
            details.sort_by(|a, b| b.primary_amount().total_cmp(&a.primary_amount()));
            details
        })
    }

    /// Groups whose drill-down has been computed.
    pub fn expanded_groups(&self) -> Vec<GroupKey> {
        self.drill.cached_keys()
    }

    /// Chat prompt text for a group or a line item, listing at most `top_n`
    /// items for a group. None for a group that does not exist.
    pub fn build_chat_context(&self, subject: ContextSubject<'_, D::Detail>, top_n: usize) -> Option<String> {
        let definition = self.definition();
        match subject {
            ContextSubject::Group(group) => {
                let aggregate = self.aggregate(group)?;
                let details = self.drill_down(group);
                let share = self.share_of_total(group);
                log_debug!("CTX", "dataset={} group={} top_n={}", definition.id, group, top_n);
                Some(build_group_context(
                    &definition.title,
                    &definition.group_label,
                    aggregate,
                    share,
                    &details,
                    top_n,
                ))
            }
            ContextSubject::Detail { group, detail } => Some(build_detail_context(
                &definition.title,
                &definition.group_label,
                group,
                detail,
            )),
        }
    }

    /// Group context using the definition's `context_top_n`.
    pub fn group_context(&self, group: &str) -> Option<String> {
        self.build_chat_context(ContextSubject::Group(group), self.definition().context_top_n)
    }

    /// Snapshot of the rollup for the presentation layer.
    pub fn snapshot(&self) -> RollupView {
        let status = self.status.read().unwrap_or_else(PoisonError::into_inner);
        match self.loaded.get() {
            Some(data) => RollupView::build(self.definition(), status.clone(), &data.index),
            None => RollupView::build(self.definition(), status.clone(), &AggregationIndex::empty()),
        }
    }
}
