//! Rate-limited cursor pagination
//!
//! [`Paginator`] drives any [`PageFetcher`] through a cursor-based, lazily
//! consumed sequence of pages. It handles the three ways a paginated source
//! misbehaves:
//!
//! - **Quota**: when the reported remaining quota drops below a low-water
//!   mark, the paginator suspends until the reported reset time and then
//!   resumes from the last cursor. A suspension is scheduling, not failure.
//! - **Transient errors**: the same cursor is retried with exponential
//!   backoff up to a bounded count; exhaustion surfaces
//!   [`ConnectorError::Transient`] and the caller skips the key without
//!   advancing any watermark.
//! - **Runaway sources**: a safety cap on total pages raises
//!   [`ConnectorError::PaginationOverrun`] instead of looping forever.
//!
//! The paginator persists nothing. A caller that wants crash-restartable
//! fetches reads [`Paginator::last_cursor`] after each consumed page and
//! later rebuilds with [`Paginator::resume_from`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::{sleep_until, Clock, SystemClock};
use crate::error::ConnectorError;

/// Opaque continuation token for resuming a paginated fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Quota state reported by the source alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window resets
    pub reset: DateTime<Utc>,
}

/// One fetched page of items
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` means the sequence is complete
    pub next_cursor: Option<Cursor>,
    /// Sources that do not report quota leave this `None`
    pub rate_limit: Option<RateLimitInfo>,
}

impl<T> Page<T> {
    /// Final page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
            rate_limit: None,
        }
    }
}

/// A source that can fetch one page at a given cursor
///
/// `cursor = None` means the start of the sequence. Implementations must be
/// safe to call again with the same cursor (the paginator retries in place).
pub trait PageFetcher {
    type Item;

    fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<Page<Self::Item>, ConnectorError>> + Send;
}

/// Paginator tuning knobs
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Maximum retry attempts for a transient failure on one cursor
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each retry)
    pub retry_base_delay_ms: u64,
    /// Safety cap on total pages per sequence
    pub max_pages: u32,
    /// Suspend when remaining quota drops to or below this
    pub rate_limit_low_water: u32,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 1000,
            max_pages: 200,
            rate_limit_low_water: 50,
        }
    }
}

impl PaginatorConfig {
    /// Get retry delay for attempt N (exponential backoff, capped at 64x)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms * (1 << attempt.min(6)))
    }
}

/// Lazy, restartable page-by-page driver over a [`PageFetcher`]
pub struct Paginator<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    config: PaginatorConfig,
    cursor: Option<Cursor>,
    pages_fetched: u32,
    done: bool,
    suspend_until: Option<DateTime<Utc>>,
}

impl<F: PageFetcher> Paginator<F, SystemClock> {
    pub fn new(fetcher: F, config: PaginatorConfig) -> Self {
        Self::with_clock(fetcher, config, SystemClock)
    }
}

impl<F: PageFetcher, C: Clock> Paginator<F, C> {
    pub fn with_clock(fetcher: F, config: PaginatorConfig, clock: C) -> Self {
        Self {
            fetcher,
            clock,
            config,
            cursor: None,
            pages_fetched: 0,
            done: false,
            suspend_until: None,
        }
    }

    /// Restart from a previously persisted cursor
    pub fn resume_from(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// The last successfully consumed cursor, for the caller to persist
    pub fn last_cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Pages fetched so far in this sequence
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetch the next page; `Ok(None)` once the source reports completion.
    pub async fn next_page(&mut self) -> Result<Option<Vec<F::Item>>, ConnectorError> {
        if self.done {
            return Ok(None);
        }
        if self.pages_fetched >= self.config.max_pages {
            warn!(
                max_pages = self.config.max_pages,
                "pagination safety cap breached - source never reported completion"
            );
            return Err(ConnectorError::PaginationOverrun {
                max_pages: self.config.max_pages,
            });
        }

        // Quota ran low on the previous page; wait out the window first
        if let Some(until) = self.suspend_until.take() {
            info!(resume_at = %until, "suspended on rate limit, waiting for reset");
            sleep_until(&self.clock, until).await;
        }

        let mut attempt: u32 = 0;
        loop {
            match self.fetcher.fetch_page(self.cursor.as_ref()).await {
                Ok(page) => {
                    self.pages_fetched += 1;
                    if let Some(rl) = &page.rate_limit {
                        if rl.remaining <= self.config.rate_limit_low_water
                            && page.next_cursor.is_some()
                        {
                            info!(
                                remaining = rl.remaining,
                                reset = %rl.reset,
                                "remaining quota below low-water mark"
                            );
                            self.suspend_until = Some(rl.reset);
                        }
                    }
                    match page.next_cursor {
                        Some(next) => self.cursor = Some(next),
                        None => self.done = true,
                    }
                    return Ok(Some(page.items));
                }
                Err(ConnectorError::RateLimited { reset }) => {
                    // Scheduled suspension; does not consume a retry attempt
                    info!(resume_at = %reset, "source reported rate limit, waiting for reset");
                    sleep_until(&self.clock, reset).await;
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_delay(attempt);
                    attempt += 1;
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient fetch failure, will retry same cursor"
                    );
                    self.clock.sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(ConnectorError::Transient {
                        attempts: attempt + 1,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drain the remaining pages into one vector
    pub async fn collect_all(&mut self) -> Result<Vec<F::Item>, ConnectorError> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod pagination_test;
