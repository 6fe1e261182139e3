use crate::config::types::{Config, CrawlerConfig, LinksConfig, OutputConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Upper bound on the worker pool size
const MAX_WORKERS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_links_config(&config.links)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Parses and checks the seed URL a crawl session starts from
///
/// The seed must be an absolute `http` or `https` URL.
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(ConfigError::MissingSeed);
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use the http or https scheme",
            seed
        )));
    }

    Ok(url)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.frontier_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "frontier_capacity must be >= 1, got {}",
            config.frontier_capacity
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.fetch_timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_timeout_ms must be >= 1 when set".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the link pattern and deny list
fn validate_links_config(config: &LinksConfig) -> Result<(), ConfigError> {
    Regex::new(&config.pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

    if config.deny.iter().any(|entry| entry.is_empty()) {
        return Err(ConfigError::Validation(
            "deny list entries cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_workers() {
        let mut config = Config::default();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_limits() {
        let mut config = Config::default();
        config.crawler.frontier_capacity = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.max_pages = Some(0);
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.fetch_timeout_ms = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_deny_list() {
        let mut config = Config::default();
        config.links.deny.push(String::new());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed("http://example.com/").is_ok());
        assert!(validate_seed("  https://example.com/page  ").is_ok());

        assert!(matches!(validate_seed(""), Err(ConfigError::MissingSeed)));
        assert!(matches!(validate_seed("   "), Err(ConfigError::MissingSeed)));
        assert!(matches!(
            validate_seed("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_seed("ftp://example.com/file"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
