//! Crawl engine - worker pool and session orchestration
//!
//! The engine owns everything one crawl session shares: the frontier, the
//! visited set, the fetcher, the link extractor, and the output sink. It seeds
//! the frontier and runs a fixed pool of workers. Each worker loops:
//!
//! 1. Take the next URL from the frontier (the only place a worker idles)
//! 2. Fetch it
//! 3. Extract links and enqueue the new, allowed ones (may wait on a full frontier)
//! 4. Hand non-empty content to the output sink
//! 5. Mark the URL visited
//!
//! The session ends when the frontier goes quiescent (empty with no URL in
//! flight), when the page budget runs out, or when it is cancelled. It also
//! ends if every worker is left waiting on a full frontier, since none of
//! them could ever drain it.

use crate::config::Config;
use crate::crawler::extractor::{DenyList, Link, LinkExtractor};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::visited::VisitedSet;
use crate::output::{CrawlSummary, OutputSink};
use crate::{ConfigError, CrawlError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawl engine structure
pub struct Engine {
    shared: Arc<Shared>,
    workers: usize,
}

/// State shared by every worker of a session
struct Shared {
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    fetcher: Fetcher,
    extractor: LinkExtractor,
    deny: DenyList,
    sink: Arc<dyn OutputSink>,
    max_pages: Option<u64>,
    cancel: CancellationToken,
    counters: Counters,
}

#[derive(Default)]
struct Counters {
    pages_taken: AtomicU64,
    pages_visited: AtomicU64,
    pages_delivered: AtomicU64,
    fetch_failures: AtomicU64,
    non_html_pages: AtomicU64,
    sink_failures: AtomicU64,
    links_enqueued: AtomicU64,
    links_duplicate: AtomicU64,
    links_denied: AtomicU64,
    budget_exhausted: AtomicBool,
}

/// Calls [`Frontier::task_done`] when a worker is finished with a URL,
/// including when the worker bails out early or panics
struct TaskGuard<'a>(&'a Frontier);

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

impl Engine {
    /// Creates a new engine for one crawl session
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Receiver of fetched page content
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Successfully created engine
    /// * `Err(CrawlError)` - The link pattern is invalid or the HTTP client failed to build
    pub fn new(config: &Config, sink: Arc<dyn OutputSink>) -> Result<Self, CrawlError> {
        let extractor = LinkExtractor::new(&config.links.pattern)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        let timeout = config.crawler.fetch_timeout_ms.map(Duration::from_millis);
        let fetcher = Fetcher::new(&config.crawler.user_agent, timeout)?;

        Ok(Self::with_parts(
            config,
            fetcher,
            extractor,
            DenyList::new(config.links.deny.iter().cloned()),
            sink,
        ))
    }

    /// Creates an engine from already-built components
    pub fn with_parts(
        config: &Config,
        fetcher: Fetcher,
        extractor: LinkExtractor,
        deny: DenyList,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        let workers = config.crawler.workers.max(1);
        let shared = Shared {
            frontier: Arc::new(Frontier::with_workers(
                config.crawler.frontier_capacity,
                workers,
            )),
            visited: Arc::new(VisitedSet::new()),
            fetcher,
            extractor,
            deny,
            sink,
            max_pages: config.crawler.max_pages.map(|n| n as u64),
            cancel: CancellationToken::new(),
            counters: Counters::default(),
        };

        Self {
            shared: Arc::new(shared),
            workers,
        }
    }

    /// Returns the token that stops this session when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Stops the session
    ///
    /// Parked workers wake up, no more URLs are admitted, and in-flight
    /// fetches are abandoned.
    pub fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    /// Returns the session's frontier
    pub fn frontier(&self) -> Arc<Frontier> {
        self.shared.frontier.clone()
    }

    /// Returns the session's visited set
    pub fn visited(&self) -> Arc<VisitedSet> {
        self.shared.visited.clone()
    }

    /// Runs the crawl session from `seed` until it ends
    ///
    /// An engine runs a single session: once this returns, the frontier is
    /// closed and further calls return immediately.
    pub async fn run(&self, seed: Url) -> CrawlSummary {
        let start_time = Instant::now();
        let shared = &self.shared;

        tracing::info!("Starting crawl from {} with {} workers", seed, self.workers);

        if shared.cancel.is_cancelled() {
            shared.frontier.close();
            return shared.summary(start_time.elapsed());
        }

        shared.visited.claim(&seed);
        if shared.frontier.put(seed).await.is_err() {
            tracing::warn!("Frontier already closed, nothing to crawl");
            return shared.summary(start_time.elapsed());
        }

        let watcher = {
            let cancel = shared.cancel.clone();
            let frontier = shared.frontier.clone();
            tokio::spawn(async move {
                cancel.cancelled().await;
                tracing::info!("Crawl cancelled, stopping workers");
                frontier.close();
            })
        };

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let shared = self.shared.clone();
            workers.spawn(async move { shared.worker_loop(id, start_time).await });
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Crawl worker failed: {}", e);
            }
        }

        watcher.abort();
        shared.frontier.close();

        let summary = shared.summary(start_time.elapsed());
        tracing::info!(
            "Crawl finished: {} pages visited, {} delivered in {:?}",
            summary.pages_visited,
            summary.pages_delivered,
            summary.elapsed
        );
        summary
    }
}

impl Shared {
    /// One long-lived worker
    async fn worker_loop(&self, id: usize, start_time: Instant) {
        tracing::trace!("Worker {} started", id);

        while let Some(url) = self.frontier.take().await {
            let _task = TaskGuard(&self.frontier);

            let taken = self.counters.pages_taken.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(max_pages) = self.max_pages {
                if taken > max_pages {
                    if !self.counters.budget_exhausted.swap(true, Ordering::SeqCst) {
                        tracing::info!("Page budget of {} reached, stopping", max_pages);
                    }
                    self.frontier.close();
                    break;
                }
            }

            tracing::debug!("Worker {} processing {}", id, url);

            let outcome = tokio::select! {
                outcome = self.fetcher.fetch_outcome(&url) => outcome,
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Abandoning fetch of {}", url);
                    break;
                }
            };

            let content = self.record_outcome(outcome);
            if !content.is_empty() {
                self.enqueue_links(&url, &content).await;
                self.deliver(&url, &content);
            }

            self.visited.mark_visited(&url);
            let visited = self.counters.pages_visited.fetch_add(1, Ordering::SeqCst) + 1;

            // Progress reporting every 10 pages
            if visited % 10 == 0 {
                let rate = visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    visited,
                    self.frontier.len(),
                    rate
                );
            }
        }

        tracing::trace!("Worker {} stopped", id);
    }

    /// Counts a fetch outcome and returns the page content
    fn record_outcome(&self, outcome: FetchOutcome) -> String {
        match &outcome {
            FetchOutcome::Page { .. } => {}
            FetchOutcome::NotHtml { .. } => {
                self.counters.non_html_pages.fetch_add(1, Ordering::Relaxed);
            }
            FetchOutcome::HttpError { .. } | FetchOutcome::NetworkError { .. } => {
                self.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome.into_content()
    }

    /// Enqueues every new, allowed link found in a page
    ///
    /// Admission is decided by [`VisitedSet::claim`], so a link discovered by
    /// several workers at once is enqueued exactly once.
    async fn enqueue_links(&self, from: &Url, content: &str) {
        let links: Vec<Link<'_>> = self.extractor.extract(content).collect();
        for link in links {
            if self.deny.is_denied(link.as_str()) {
                tracing::trace!("Denied link {}", link.as_str());
                self.counters.links_denied.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let link = link.into_url();

            if self.visited.contains(&link)
                || self.frontier.contains(&link)
                || !self.visited.claim(&link)
            {
                self.counters.links_duplicate.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if self.frontier.put(link).await.is_err() {
                tracing::debug!("Frontier closed, dropping remaining links from {}", from);
                break;
            }
            self.counters.links_enqueued.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Hands a page to the output sink; sink errors are logged and absorbed
    fn deliver(&self, url: &Url, content: &str) {
        match self.sink.receive(url, content) {
            Ok(()) => {
                self.counters.pages_delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::warn!("Output sink failed for {}: {}", url, e);
                self.counters.sink_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn summary(&self, elapsed: Duration) -> CrawlSummary {
        let c = &self.counters;
        CrawlSummary {
            pages_visited: c.pages_visited.load(Ordering::SeqCst),
            pages_delivered: c.pages_delivered.load(Ordering::SeqCst),
            fetch_failures: c.fetch_failures.load(Ordering::SeqCst),
            non_html_pages: c.non_html_pages.load(Ordering::SeqCst),
            sink_failures: c.sink_failures.load(Ordering::SeqCst),
            links_enqueued: c.links_enqueued.load(Ordering::SeqCst),
            links_duplicate: c.links_duplicate.load(Ordering::SeqCst),
            links_denied: c.links_denied.load(Ordering::SeqCst),
            elapsed,
            cancelled: self.cancel.is_cancelled(),
            budget_exhausted: c.budget_exhausted.load(Ordering::SeqCst),
            stalled: self.frontier.is_stalled(),
        }
    }
}
