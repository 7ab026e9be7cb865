//! FILENAME: core/table-source/src/loader.rs
//! Paginated Loader - reads a whole table into memory one page at a time.
//!
//! Algorithm:
//! 1. Request `[offset, offset + page_size)` starting at offset 0
//! 2. Append every returned row to the accumulator
//! 3. Stop on an empty page or a page shorter than `page_size`
//! 4. Otherwise advance `offset` by `page_size` and repeat
//!
//! Pages are awaited strictly in order, so row order is reproducible for a
//! static table. Each page is bounded by a timeout and may be retried a
//! bounded number of times; the cancellation token is honoured at every page
//! boundary and while a request is in flight. Any page that still fails
//! aborts the load and no rows are returned.

use std::time::{Duration, Instant};

use fiscal::{log_debug, log_info, log_warn};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::error::{LoadError, SourceError};
use crate::source::{RangeRequest, TableSource};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    pub page_size: usize,
    /// Upper bound on a single range read.
    pub page_timeout_ms: u64,
    /// Extra attempts per page after the first failure.
    pub max_retries: u32,
    /// Delay before retry `n` is `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            page_size: DEFAULT_PAGE_SIZE,
            page_timeout_ms: 30_000,
            max_retries: 1,
            retry_backoff_ms: 250,
        }
    }
}

impl LoaderConfig {
    /// No retries: the first failed page fails the load.
    pub fn strict() -> Self {
        LoaderConfig {
            max_retries: 0,
            ..LoaderConfig::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Summary of a completed load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub rows: usize,
    pub pages: usize,
    pub retries: u32,
    pub elapsed: Duration,
}

/// Outcome of one failed attempt, before the retry decision.
enum PageFailure {
    Source(SourceError),
    Timeout,
}

// ============================================================================
// LOADER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PaginatedLoader {
    config: LoaderConfig,
}

impl PaginatedLoader {
    pub fn new(config: LoaderConfig) -> Self {
        PaginatedLoader { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads every row of `table`. Returns the rows in source order.
    pub async fn load<R, S>(
        &self,
        source: &S,
        table: &str,
        columns: &[String],
        cancel: &CancellationToken,
    ) -> Result<(Vec<R>, LoadReport), LoadError>
    where
        R: Send,
        S: TableSource<R> + ?Sized,
    {
        let page_size = self.config.page_size;
        if page_size == 0 {
            return Err(LoadError::InvalidPageSize);
        }

        let started = Instant::now();
        let mut rows: Vec<R> = Vec::new();
        let mut offset = 0usize;
        let mut pages = 0usize;
        let mut retries = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(LoadError::Cancelled { offset });
            }

            let request = RangeRequest::new(table, columns, offset, page_size);
            let (page, page_retries) = self.fetch_page(source, &request, cancel).await?;
            pages += 1;
            retries += page_retries;

            let received = page.len();
            rows.extend(page);
            log_debug!("LOAD", "table={} offset={} received={}", table, offset, received);

            if received < page_size {
                break;
            }
            offset += page_size;
        }

        let report = LoadReport {
            rows: rows.len(),
            pages,
            retries,
            elapsed: started.elapsed(),
        };
        log_info!(
            "LOAD",
            "table={} rows={} pages={} retries={} elapsed_ms={}",
            table,
            report.rows,
            report.pages,
            report.retries,
            report.elapsed.as_millis()
        );
        Ok((rows, report))
    }

    /// Reads one page, retrying up to `max_retries` times.
    /// Returns the rows and the number of retries used.
    async fn fetch_page<R, S>(
        &self,
        source: &S,
        request: &RangeRequest,
        cancel: &CancellationToken,
    ) -> Result<(Vec<R>, u32), LoadError>
    where
        R: Send,
        S: TableSource<R> + ?Sized,
    {
        let offset = request.offset;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoadError::Cancelled { offset }),
                result = tokio::time::timeout(self.config.page_timeout(), source.read_range(request)) => result,
            };

            let failure = match outcome {
                Ok(Ok(rows)) => return Ok((rows, attempt - 1)),
                Ok(Err(err)) => PageFailure::Source(err),
                Err(_) => PageFailure::Timeout,
            };

            if attempt > self.config.max_retries {
                return Err(match failure {
                    PageFailure::Source(source) => LoadError::Page {
                        offset,
                        attempts: attempt,
                        source,
                    },
                    PageFailure::Timeout => LoadError::Timeout {
                        offset,
                        attempts: attempt,
                    },
                });
            }

            match &failure {
                PageFailure::Source(err) => {
                    log_warn!("LOAD", "table={} offset={} attempt={} error={}", request.table, offset, attempt, err)
                }
                PageFailure::Timeout => {
                    log_warn!("LOAD", "table={} offset={} attempt={} timed out", request.table, offset, attempt)
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoadError::Cancelled { offset }),
                _ = tokio::time::sleep(self.config.backoff_for_attempt(attempt)) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;

    fn loader(page_size: usize) -> PaginatedLoader {
        PaginatedLoader::new(LoaderConfig {
            page_size,
            page_timeout_ms: 1_000,
            max_retries: 1,
            retry_backoff_ms: 1,
        })
    }

    async fn load_all(
        loader: &PaginatedLoader,
        source: &MemorySource<u32>,
    ) -> Result<(Vec<u32>, LoadReport), LoadError> {
        loader.load(source, "numbers", &[], &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_short_last_page_stops() {
        let source = MemorySource::new((0..2500).collect::<Vec<u32>>());
        let (rows, report) = load_all(&loader(1000), &source).await.unwrap();

        assert_eq!(rows, (0..2500).collect::<Vec<u32>>());
        assert_eq!(report.pages, 3);
        assert_eq!(source.requested_offsets(), vec![0, 1000, 2000]);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_empty_page() {
        let source = MemorySource::new((0..2000).collect::<Vec<u32>>());
        let (rows, report) = load_all(&loader(1000), &source).await.unwrap();

        assert_eq!(rows.len(), 2000);
        assert_eq!(report.pages, 3);
        assert_eq!(source.requested_offsets(), vec![0, 1000, 2000]);
    }

    #[tokio::test]
    async fn test_empty_table() {
        let source = MemorySource::new(Vec::<u32>::new());
        let (rows, report) = load_all(&loader(1000), &source).await.unwrap();

        assert!(rows.is_empty());
        assert_eq!(report.pages, 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_single_failure() {
        let source = MemorySource::new((0..15).collect::<Vec<u32>>()).failing_at_times(10, 1);
        let (rows, report) = load_all(&loader(10), &source).await.unwrap();

        assert_eq!(rows.len(), 15);
        assert_eq!(report.retries, 1);
        assert_eq!(source.requested_offsets(), vec![0, 10, 10]);
    }

    #[tokio::test]
    async fn test_persistent_failure_aborts_load() {
        let source = MemorySource::new((0..35).collect::<Vec<u32>>()).failing_at(20);
        let err = load_all(&loader(10), &source).await.unwrap_err();

        match err {
            LoadError::Page { offset, attempts, .. } => {
                assert_eq!(offset, 20);
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing past the failed page is requested
        assert_eq!(source.requested_offsets(), vec![0, 10, 20, 20]);
    }

    #[tokio::test]
    async fn test_strict_config_does_not_retry() {
        let source = MemorySource::new((0..5).collect::<Vec<u32>>()).failing_at_times(0, 1);
        let strict = PaginatedLoader::new(LoaderConfig::strict().with_page_size(10));
        let err = load_all(&strict, &source).await.unwrap_err();

        assert!(matches!(err, LoadError::Page { attempts: 1, .. }));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_page_timeout() {
        let source = MemorySource::new((0..5).collect::<Vec<u32>>())
            .with_delay(Duration::from_millis(200));
        let slow = PaginatedLoader::new(LoaderConfig {
            page_size: 10,
            page_timeout_ms: 10,
            max_retries: 1,
            retry_backoff_ms: 1,
        });
        let err = load_all(&slow, &source).await.unwrap_err();

        assert!(matches!(err, LoadError::Timeout { offset: 0, attempts: 2 }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let source = MemorySource::new((0..5).collect::<Vec<u32>>());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = loader(10)
            .load::<u32, _>(&source, "numbers", &[], &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_inflight_page() {
        let source = MemorySource::new((0..5).collect::<Vec<u32>>())
            .with_delay(Duration::from_millis(500));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = loader(10)
            .load::<u32, _>(&source, "numbers", &[], &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.offset(), Some(0));
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_zero_page_size_rejected() {
        let source = MemorySource::new(vec![1u32]);
        let err = load_all(&loader(0), &source).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidPageSize));
    }
}
