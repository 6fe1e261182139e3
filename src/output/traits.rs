//! Output sink trait and crawl summary types
//!
//! This module defines the trait interface for output sinks and the
//! summary a finished crawl session reports.

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur inside an output sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Consumer of fetched page content
///
/// `receive` is called once per successfully fetched, non-empty HTML page,
/// from whichever worker fetched it. Calls may happen concurrently and in any
/// order, so implementations must be thread-safe.
///
/// An error returned here is logged by the engine and otherwise ignored.
pub trait OutputSink: Send + Sync {
    /// Receives one crawled page
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the page was fetched from
    /// * `content` - The page's raw text
    fn receive(&self, url: &Url, content: &str) -> SinkResult<()>;
}

/// Summary statistics for a crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs whose fetch attempt completed
    pub pages_visited: u64,

    /// Pages handed to the output sink without error
    pub pages_delivered: u64,

    /// Fetches that ended in a network or HTTP error
    pub fetch_failures: u64,

    /// Fetches skipped because the resource was not HTML
    pub non_html_pages: u64,

    /// Sink calls that returned an error
    pub sink_failures: u64,

    /// Discovered links added to the frontier
    pub links_enqueued: u64,

    /// Discovered links already queued or visited
    pub links_duplicate: u64,

    /// Discovered links rejected by the deny list
    pub links_denied: u64,

    /// Wall-clock duration of the session
    pub elapsed: Duration,

    /// The session was stopped by its cancellation token
    pub cancelled: bool,

    /// The session stopped because the page budget ran out
    pub budget_exhausted: bool,

    /// The session stopped because every worker was waiting on a full frontier
    pub stalled: bool,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the session ran until the frontier was exhausted
    pub fn completed(&self) -> bool {
        !self.cancelled && !self.budget_exhausted && !self.stalled
    }

    /// Returns the success rate as a percentage of visited pages
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_delivered as f64 / self.pages_visited as f64) * 100.0
    }

    /// Returns visited pages per second
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.pages_visited as f64 / secs
    }
}
