//! Logging output sink
//!
//! Used when no database is configured: each page is reported through
//! `tracing` and its content is discarded.

use crate::output::traits::{OutputSink, SinkResult};
use url::Url;

/// Output sink that only logs received pages
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for LogSink {
    fn receive(&self, url: &Url, content: &str) -> SinkResult<()> {
        tracing::info!("Crawled {} ({} bytes)", url, content.len());
        Ok(())
    }
}
