use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// Missing sections and keys fall back to their defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FRONTIER_CAPACITY, DEFAULT_WORKERS};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
workers = 8
frontier-capacity = 100
max-pages = 1000
fetch-timeout-ms = 5000
user-agent = "TestCrawler/1.0"

[links]
deny = ["w3.org", "example.org"]

[output]
database-path = "./pages.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 8);
        assert_eq!(config.crawler.frontier_capacity, 100);
        assert_eq!(config.crawler.max_pages, Some(1000));
        assert_eq!(config.crawler.fetch_timeout_ms, Some(5000));
        assert_eq!(config.crawler.user_agent, "TestCrawler/1.0");
        assert_eq!(config.links.deny.len(), 2);
        assert_eq!(config.output.database_path.as_deref(), Some("./pages.db"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.crawler.workers, DEFAULT_WORKERS);
        assert_eq!(config.crawler.frontier_capacity, DEFAULT_FRONTIER_CAPACITY);
        assert_eq!(config.crawler.max_pages, None);
        assert_eq!(config.crawler.fetch_timeout_ms, None);
        assert_eq!(config.links.deny, vec!["w3.org".to_string()]);
        assert!(config.output.database_path.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[crawler]\nworkers = 3\n").unwrap();
        assert_eq!(config.crawler.workers, 3);
        assert_eq!(config.crawler.frontier_capacity, DEFAULT_FRONTIER_CAPACITY);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawler.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nworkers = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_config_with_bad_pattern() {
        let file = create_temp_config("[links]\npattern = \"(unclosed\"\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidPattern(_)));
    }
}
