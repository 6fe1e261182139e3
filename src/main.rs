//! Webcrawler main entry point
//!
//! This is the command-line interface for the breadth-first crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webcrawler::config::{load_config, validate, validate_seed, Config};
use webcrawler::crawler::Engine;
use webcrawler::output::{open_sink, print_summary};

/// Webcrawler: a breadth-first link-following crawler
///
/// Starting from the seed URL, fetches pages, finds absolute URLs in their
/// text, and follows every one it has not seen yet. Page content is stored
/// in SQLite when a database is configured, otherwise only logged.
#[derive(Parser, Debug)]
#[command(name = "webcrawler")]
#[command(version)]
#[command(about = "A breadth-first link-following crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum number of URLs waiting in the frontier
    #[arg(long)]
    frontier_capacity: Option<usize>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// SQLite database receiving page content
    #[arg(short, long, value_name = "PATH")]
    database: Option<String>,

    /// Regular expression recognizing links in page text
    #[arg(long)]
    pattern: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.crawler.workers = workers;
        }
        if let Some(capacity) = self.frontier_capacity {
            config.crawler.frontier_capacity = capacity;
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = Some(max_pages);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.crawler.fetch_timeout_ms = Some(timeout_ms);
        }
        if let Some(database) = &self.database {
            config.output.database_path = Some(database.clone());
        }
        if let Some(pattern) = &self.pattern {
            config.links.pattern = pattern.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Configuration errors are fatal before any crawling starts
    let seed = validate_seed(&cli.seed).context("Invalid seed URL")?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    let sink = open_sink(&config.output).context("Failed to open output")?;
    let engine = Engine::new(&config, sink).context("Failed to start crawler")?;

    let token = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            token.cancel();
        }
    });

    let summary = engine.run(seed).await;

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webcrawler=info,warn"),
            1 => EnvFilter::new("webcrawler=debug,info"),
            2 => EnvFilter::new("webcrawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_required() {
        let result = Cli::try_parse_from(["webcrawler"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "webcrawler",
            "http://example.com/",
            "--workers",
            "4",
            "--max-pages",
            "20",
            "--database",
            "pages.db",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.crawler.max_pages, Some(20));
        assert_eq!(config.output.database_path.as_deref(), Some("pages.db"));
        assert_eq!(config.crawler.fetch_timeout_ms, None);
    }
}
