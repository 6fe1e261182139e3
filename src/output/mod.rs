//! Output module for crawled page content
//!
//! This module handles:
//! - The sink interface the crawl engine delivers pages to
//! - Persisting pages to SQLite
//! - Logging pages when no database is configured
//! - Reporting the session summary

mod log_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use log_output::LogSink;
pub use sqlite_output::SqliteSink;
pub use stats::print_summary;
pub use traits::{CrawlSummary, OutputSink, SinkError, SinkResult};

use crate::config::OutputConfig;
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Builds the output sink described by the configuration
///
/// A configured database path selects [`SqliteSink`]; otherwise pages are
/// only logged.
pub fn open_sink(config: &OutputConfig) -> Result<Arc<dyn OutputSink>, CrawlError> {
    match &config.database_path {
        Some(path) => {
            tracing::info!("Writing pages to database: {}", path);
            Ok(Arc::new(SqliteSink::new(Path::new(path))?))
        }
        None => Ok(Arc::new(LogSink::new())),
    }
}
