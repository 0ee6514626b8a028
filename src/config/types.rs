use serde::Deserialize;

/// Main configuration structure for Pantry Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// What the coordinator does when every fetch slot is busy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationPolicy {
    /// Wait for a free slot
    #[default]
    Wait,
    /// Drop the task with a warning
    Drop,
}

impl SaturationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Drop => "drop",
        }
    }
}

/// Link-following crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs (seeds are depth 1)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of product pages fetched at the same time
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: u32,

    #[serde(default)]
    pub saturation: SaturationPolicy,

    /// Minimum age before an existing product is overwritten (hours)
    #[serde(
        rename = "freshness-threshold-hours",
        default = "default_crawler_threshold"
    )]
    pub freshness_threshold_hours: i64,

    /// Category pages the crawl starts from
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_concurrent_fetches: default_max_concurrent(),
            saturation: SaturationPolicy::default(),
            freshness_threshold_hours: default_crawler_threshold(),
            seeds: default_seeds(),
        }
    }
}

/// Sitemap crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    /// Sitemap file URL with an `{index}` placeholder
    #[serde(rename = "url-template", default = "default_sitemap_template")]
    pub url_template: String,

    #[serde(rename = "first-index", default)]
    pub first_index: u32,

    #[serde(rename = "last-index", default = "default_sitemap_last_index")]
    pub last_index: u32,

    /// Minimum age before an existing product is overwritten (hours)
    #[serde(
        rename = "freshness-threshold-hours",
        default = "default_sitemap_threshold"
    )]
    pub freshness_threshold_hours: i64,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            url_template: default_sitemap_template(),
            first_index: 0,
            last_index: default_sitemap_last_index(),
            freshness_threshold_hours: default_sitemap_threshold(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Retries for transient failures, on top of the first attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, doubled on every further retry (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

/// Markup facts about the target catalog
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Department paths a genuine product's breadcrumb must point into
    #[serde(
        rename = "genuine-category-paths",
        default = "default_genuine_category_paths"
    )]
    pub genuine_category_paths: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            genuine_category_paths: default_genuine_category_paths(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_max_depth() -> u32 {
    5
}

fn default_max_concurrent() -> u32 {
    10
}

fn default_crawler_threshold() -> i64 {
    12
}

fn default_sitemap_threshold() -> i64 {
    24
}

fn default_seeds() -> Vec<String> {
    [
        "https://www.auchan.ro/brutarie-cofetarie-gastro/c",
        "https://www.auchan.ro/bauturi-si-tutun/c",
        "https://www.auchan.ro/bacanie/c",
        "https://www.auchan.ro/lactate-carne-mezeluri---peste/c",
        "https://www.auchan.ro/fructe-si-legume/c",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sitemap_template() -> String {
    "https://www.auchan.ro/sitemap/product-{index}.xml".to_string()
}

fn default_sitemap_last_index() -> u32 {
    11
}

fn default_user_agent() -> String {
    format!("pantry-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_genuine_category_paths() -> Vec<String> {
    [
        "/brutarie,-cofetarie,-gastro/d",
        "/bacanie/d",
        "/lactate,-carne,-mezeluri-&-peste/d",
        "/fructe-si-legume/d",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
