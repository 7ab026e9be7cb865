//! FILENAME: core/table-source/src/memory.rs
//! PURPOSE: An in-process table served through the range-read contract.
//! CONTEXT: Used for offline dashboards, fixtures and benchmarks. Failure and
//! latency injection let callers exercise the loader's error paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use crate::error::SourceError;
use crate::source::{RangeRequest, TableSource};

/// Failure injected at one page offset.
#[derive(Debug, Clone, Copy)]
struct InjectedFailure {
    offset: usize,
    /// How many requests at `offset` fail before it starts succeeding.
    /// `usize::MAX` fails forever.
    times: usize,
}

pub struct MemorySource<R> {
    rows: Vec<R>,
    failure: Option<InjectedFailure>,
    failures_served: AtomicUsize,
    delay: Option<Duration>,
    requests: AtomicUsize,
    offsets: Mutex<Vec<usize>>,
}

impl<R> MemorySource<R> {
    pub fn new(rows: Vec<R>) -> Self {
        MemorySource {
            rows,
            failure: None,
            failures_served: AtomicUsize::new(0),
            delay: None,
            requests: AtomicUsize::new(0),
            offsets: Mutex::new(Vec::new()),
        }
    }

    /// Every request at `offset` fails.
    pub fn failing_at(mut self, offset: usize) -> Self {
        self.failure = Some(InjectedFailure { offset, times: usize::MAX });
        self
    }

    /// The first `times` requests at `offset` fail, later ones succeed.
    pub fn failing_at_times(mut self, offset: usize, times: usize) -> Self {
        self.failure = Some(InjectedFailure { offset, times });
        self
    }

    /// Every request sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of range reads served so far (including failed ones).
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Offsets requested, in arrival order.
    pub fn requested_offsets(&self) -> Vec<usize> {
        self.offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn should_fail(&self, offset: usize) -> bool {
        match self.failure {
            Some(failure) if failure.offset == offset => {
                let served = self.failures_served.fetch_add(1, Ordering::SeqCst);
                served < failure.times
            }
            _ => false,
        }
    }
}

#[async_trait]
impl<R> TableSource<R> for MemorySource<R>
where
    R: Clone + Send + Sync,
{
    async fn read_range(&self, request: &RangeRequest) -> Result<Vec<R>, SourceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.offset);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail(request.offset) {
            return Err(SourceError::Unavailable(format!(
                "injected failure reading {} at offset {}",
                request.table, request.offset
            )));
        }

        let start = request.offset.min(self.rows.len());
        let end = request.offset.saturating_add(request.limit).min(self.rows.len());
        Ok(self.rows[start..end].to_vec())
    }
}
