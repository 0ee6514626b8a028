use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, SiteConfig, SitemapConfig,
};
use crate::ConfigError;
use url::Url;

/// Placeholder the sitemap template must contain
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max_depth must be >= 1 (seeds are depth 1)".to_string(),
        ));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    validate_threshold("crawler", config.freshness_threshold_hours)?;

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "crawler must have at least one seed URL".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_http_url("seed", seed)?;
    }

    Ok(())
}

/// Validates sitemap configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if !config.url_template.contains(INDEX_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "sitemap url_template must contain {}, got '{}'",
            INDEX_PLACEHOLDER, config.url_template
        )));
    }

    let sample = config
        .url_template
        .replace(INDEX_PLACEHOLDER, &config.first_index.to_string());
    validate_http_url("sitemap url_template", &sample)?;

    if config.first_index > config.last_index {
        return Err(ConfigError::Validation(format!(
            "sitemap first_index ({}) must not exceed last_index ({})",
            config.first_index, config.last_index
        )));
    }

    validate_threshold("sitemap", config.freshness_threshold_hours)?;

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be > 0, got timeout_secs={} connect_timeout_secs={}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates site markup configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config
        .genuine_category_paths
        .iter()
        .all(|path| path.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "genuine_category_paths must contain at least one non-empty path".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// A threshold of 0 forces every existing product to be refreshed
fn validate_threshold(section: &str, hours: i64) -> Result<(), ConfigError> {
    if hours < 0 {
        return Err(ConfigError::Validation(format!(
            "{} freshness_threshold_hours must be >= 0, got {}",
            section, hours
        )));
    }
    Ok(())
}

fn validate_http_url(what: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig::default(),
            sitemap: SitemapConfig::default(),
            fetcher: FetcherConfig::default(),
            site: SiteConfig::default(),
            output: OutputConfig {
                database_path: "./products.db".to_string(),
            },
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = valid_config();
        config.crawler.max_concurrent_fetches = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.max_concurrent_fetches = 101;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_fetches = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = valid_config();
        config.crawler.max_depth = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_threshold_zero_allowed_negative_rejected() {
        let mut config = valid_config();
        config.crawler.freshness_threshold_hours = 0;
        assert!(validate(&config).is_ok());

        config.sitemap.freshness_threshold_hours = -1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_seed() {
        let mut config = valid_config();
        config.crawler.seeds = vec!["ftp://www.auchan.ro/bacanie/c".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.crawler.seeds = vec!["/bacanie/c".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_sitemap_template_requires_placeholder() {
        let mut config = valid_config();
        config.sitemap.url_template = "https://www.auchan.ro/sitemap/product-0.xml".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_sitemap_index_range() {
        let mut config = valid_config();
        config.sitemap.first_index = 5;
        config.sitemap.last_index = 4;
        assert!(validate(&config).is_err());

        config.sitemap.last_index = 5;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = valid_config();
        config.output.database_path = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
