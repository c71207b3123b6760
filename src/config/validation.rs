use crate::config::types::{compile_patterns, CrawlConfig};
use crate::crawler::{OVERRIDE_PARALLEL, OVERRIDE_SEQUENTIAL};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Runs after deserialization and before any crawl work starts, so every
/// invalid value is reported as a configuration error up front.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_timeout(config)?;
    validate_patterns(config)?;
    validate_override(config)?;
    Ok(())
}

fn validate_timeout(config: &CrawlConfig) -> Result<(), ConfigError> {
    // max_depth and popular_word_count are unsigned, so no lower-bound checks
    // are needed for them.

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeoutSeconds must be at least 1, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

fn validate_patterns(config: &CrawlConfig) -> Result<(), ConfigError> {
    compile_patterns(&config.ignored_urls)?;
    compile_patterns(&config.ignored_words)?;
    Ok(())
}

fn validate_override(config: &CrawlConfig) -> Result<(), ConfigError> {
    let name = config.implementation_override.trim();
    if name.is_empty() || name == OVERRIDE_SEQUENTIAL || name == OVERRIDE_PARALLEL {
        Ok(())
    } else {
        Err(ConfigError::UnknownImplementation(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CrawlConfig {
        serde_json::from_str(r#"{"startPages": ["http://example.com"]}"#).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = base_config();
        config.ignored_urls = vec![".*\\.pdf$".to_string()];
        config.ignored_words = vec!["^.{1,3}$".to_string()];
        config.timeout_seconds = 5;

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_start_pages_is_valid() {
        // A crawl with no starting URLs simply visits nothing.
        let mut config = base_config();
        config.start_pages.clear();

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = base_config();
        config.timeout_seconds = 0;

        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_ignored_url_pattern_rejected() {
        let mut config = base_config();
        config.ignored_urls = vec!["[unclosed".to_string()];

        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_ignored_word_pattern_rejected() {
        let mut config = base_config();
        config.ignored_words = vec!["(?P<".to_string()];

        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_known_overrides_accepted() {
        for name in ["", "sequential", "parallel", " parallel "] {
            let mut config = base_config();
            config.implementation_override = name.to_string();
            assert!(validate(&config).is_ok(), "override {name:?} should pass");
        }
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut config = base_config();
        config.implementation_override = "distributed".to_string();

        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnknownImplementation(_))
        ));
    }
}
