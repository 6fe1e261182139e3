//! Crawler module for page fetching and link following
//!
//! This module contains the core crawling logic, including:
//! - The bounded frontier of URLs awaiting fetch
//! - The visited set used for deduplication
//! - HTTP fetching filtered to HTML content
//! - Pattern-based link extraction and the deny list
//! - The engine running the worker pool

mod engine;
mod extractor;
mod fetcher;
mod frontier;
mod visited;

pub use engine::Engine;
pub use extractor::{DenyList, Link, LinkExtractor, Links, DEFAULT_DENY_LIST, DEFAULT_LINK_PATTERN};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use frontier::{Frontier, FrontierClosed};
pub use visited::VisitedSet;

use crate::config::Config;
use crate::output::{CrawlSummary, OutputSink};
use crate::CrawlError;
use std::sync::Arc;
use url::Url;

/// Runs a complete crawl session
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the engine from the configuration
/// 2. Seed the frontier with `seed`
/// 3. Run the worker pool until the frontier is exhausted or the page budget runs out
/// 4. Return the session summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL the crawl starts from
/// * `sink` - Receiver of fetched page content
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use webcrawler::config::Config;
/// use webcrawler::crawler::crawl;
/// use webcrawler::output::LogSink;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = url::Url::parse("http://example.com/")?;
/// let summary = crawl(&Config::default(), seed, Arc::new(LogSink::new())).await?;
/// println!("Visited {} pages", summary.pages_visited);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    seed: Url,
    sink: Arc<dyn OutputSink>,
) -> Result<CrawlSummary, CrawlError> {
    let engine = Engine::new(config, sink)?;
    Ok(engine.run(seed).await)
}
