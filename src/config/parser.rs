use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the configuration file at `path`
///
/// Sections other than `[output]` fall back to the catalog defaults when
/// absent.
///
/// # Errors
///
/// * `ConfigError::Io` - The file could not be read
/// * `ConfigError::Parse` - The file is not valid TOML or has unknown value types
/// * `ConfigError::Validation` / `ConfigError::InvalidUrl` - A value is out of range
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pantry_crawler::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let source = std::fs::read_to_string(path)?;
    parse_config(&source)
}

/// Parses and validates configuration text
pub fn parse_config(source: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(source)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration file's bytes
///
/// Stored with every crawl run so runs made under different configurations
/// can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let source = std::fs::read_to_string(path)?;
    Ok(hash_source(&source))
}

/// Loads a configuration together with the hash of the exact text it was parsed from
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let source = std::fs::read_to_string(path)?;
    let config = parse_config(&source)?;
    Ok((config, hash_source(&source)))
}

fn hash_source(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}
