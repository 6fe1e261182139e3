//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Filtering responses down to HTML content
//! - Classifying failures so the caller can count them
//!
//! Failures never propagate: to the crawl loop a failed fetch is simply a
//! page with no content.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The resource was HTML and its body was read
    Page {
        /// Page body content
        body: String,
    },

    /// The resource declared a non-HTML Content-Type (or none at all)
    NotHtml {
        /// The Content-Type received, empty if the header was missing
        content_type: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network or protocol failure (DNS, connection refused, timeout, bad scheme, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Returns the page content, or an empty string for every kind of failure
    pub fn into_content(self) -> String {
        match self {
            Self::Page { body } => body,
            _ => String::new(),
        }
    }

    /// Returns true if a network or HTTP error occurred
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpError { .. } | Self::NetworkError { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Per-request timeout; `None` leaves requests unbounded
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &str,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Performs page fetches for a crawl session
///
/// Holds no per-fetch state, so one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout)?,
        })
    }

    /// Fetches a URL and returns its text, or an empty string
    ///
    /// Non-HTML resources and every kind of failure yield an empty string.
    pub async fn fetch(&self, url: &Url) -> String {
        self.fetch_outcome(url).await.into_content()
    }

    /// Fetches a URL and reports what happened
    ///
    /// # Request Flow
    ///
    /// 1. Send a GET request (redirects followed by the client)
    /// 2. Non-success status → `HttpError`
    /// 3. Content-Type not starting with `text/html` → `NotHtml`
    /// 4. Read the body → `Page`
    ///
    /// Failures are logged here.
    pub async fn fetch_outcome(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Could not crawl {}: {}", url, e);
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection failed".to_string()
                } else {
                    e.to_string()
                };
                return FetchOutcome::NetworkError { error };
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Could not crawl {}: HTTP {}", url, status.as_u16());
            return FetchOutcome::HttpError {
                status_code: status.as_u16(),
            };
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            tracing::debug!("Skipping {}: content type '{}'", url, content_type);
            return FetchOutcome::NotHtml { content_type };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Page { body },
            Err(e) => {
                tracing::warn!("Could not read body of {}: {}", url, e);
                FetchOutcome::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Returns true if a Content-Type header value denotes HTML
fn is_html(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}
