use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a crawl configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use lexicrawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.json")).unwrap();
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse JSON
    let config: CrawlConfig = serde_json::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}
