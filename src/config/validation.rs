use crate::config::types::{Config, CrawlerConfig, ExtractorConfig, StoreConfig};
use crate::ConfigError;
use url::Url;

/// One day
const MAX_REQUEST_TIMEOUT_MINUTES: u64 = 24 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_store_config(&config.store)?;
    validate_extractor_config(&config.extractor)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_minutes < 1
        || config.request_timeout_minutes > MAX_REQUEST_TIMEOUT_MINUTES
    {
        return Err(ConfigError::Validation(format!(
            "request_timeout_minutes must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_MINUTES, config.request_timeout_minutes
        )));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 64, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_requests_per_crawl == Some(0) {
        return Err(ConfigError::Validation(
            "max_requests_per_crawl must be >= 1 when set".to_string(),
        ));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates backend store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    validate_http_url("api_base", &config.api_base)?;

    // Both or neither
    if config.email.is_empty() != config.password.is_empty() {
        return Err(ConfigError::Validation(
            "store email and password must be set together".to_string(),
        ));
    }

    if config.sites_collection.is_empty() || config.records_collection.is_empty() {
        return Err(ConfigError::Validation(
            "store collection names cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction service configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    validate_http_url("endpoint", &config.endpoint)?;

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "extractor timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

/// Validates that a setting holds an absolute HTTP(S) URL
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}
