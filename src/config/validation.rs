use crate::config::types::{Config, InputConfig, OutputConfig, RoundsConfig, SiteConfig, WorkloadConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_rounds_config(&config.engine)?;
    validate_workload_config("fetch", &config.fetch)?;
    validate_workload_config("like", &config.like)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site URL and session cookies
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in &config.cookies {
        validate_cookie(name, value)?;
    }

    Ok(())
}

/// Validates the round ceiling
fn validate_rounds_config(config: &RoundsConfig) -> Result<(), ConfigError> {
    if config.max_rounds < 1 || config.max_rounds > 50 {
        return Err(ConfigError::Validation(format!(
            "max-rounds must be between 1 and 50, got {}",
            config.max_rounds
        )));
    }

    Ok(())
}

/// Validates pool size and timeout of one workload section
fn validate_workload_config(section: &str, config: &WorkloadConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "[{}] concurrency must be between 1 and 100, got {}",
            section, config.concurrency
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "[{}] timeout-secs must be >= 1, got {}",
            section, config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.targets_path.is_empty() {
        return Err(ConfigError::Validation(
            "targets-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.url_column, Some(column) if column.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "url-column cannot be blank when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    if config.failed_path.is_empty() {
        return Err(ConfigError::Validation(
            "failed-path cannot be empty".to_string(),
        ));
    }

    if config.articles_path.is_empty() {
        return Err(ConfigError::Validation(
            "articles-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// A cookie pair must survive being joined into a single `Cookie` header
fn validate_cookie(name: &str, value: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "cookie name cannot be empty".to_string(),
        ));
    }

    if name
        .chars()
        .any(|c| c == ';' || c == '=' || c.is_whitespace() || c.is_control())
    {
        return Err(ConfigError::Validation(format!(
            "cookie name '{}' contains invalid characters",
            name
        )));
    }

    if value.chars().any(|c| c == ';' || c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "value of cookie '{}' contains invalid characters",
            name
        )));
    }

    Ok(())
}
