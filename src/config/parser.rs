use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates the configuration file at `path`
///
/// # Errors
///
/// * `ConfigError::Io` - the file could not be read
/// * `ConfigError::Parse` - the file is not valid TOML for [`Config`]
/// * `ConfigError::Validation` / `ConfigError::InvalidUrl` - a value is out of range
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_sweep::config::load_config;
///
/// let config = load_config(Path::new("sweep.toml")).unwrap();
/// println!("Max rounds: {}", config.engine.max_rounds);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration text
///
/// Recorded with every run so the history shows which settings produced it.
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads the file at `path` and hashes it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(config_hash(&content))
}

/// Loads a configuration together with the hash of the exact text parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}
