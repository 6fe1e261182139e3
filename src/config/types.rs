use crate::crawler::{DEFAULT_DENY_LIST, DEFAULT_LINK_PATTERN};
use serde::Deserialize;

/// Number of concurrent crawl workers when none is configured
pub const DEFAULT_WORKERS: usize = 50;

/// Frontier capacity when none is configured
pub const DEFAULT_FRONTIER_CAPACITY: usize = 500;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub links: LinksConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of long-lived crawl workers
    pub workers: usize,

    /// Maximum number of URLs waiting in the frontier
    #[serde(rename = "frontier-capacity")]
    pub frontier_capacity: usize,

    /// Stop the session after this many URLs have been dequeued
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Per-request timeout (milliseconds); no timeout when unset
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            frontier_capacity: DEFAULT_FRONTIER_CAPACITY,
            max_pages: None,
            fetch_timeout_ms: None,
            user_agent: format!("webcrawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Regular expression that recognizes a URL occurrence in page text
    pub pattern: String,

    /// Substrings that exclude a discovered URL from the frontier
    pub deny: Vec<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_LINK_PATTERN.to_string(),
            deny: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database receiving page content
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
