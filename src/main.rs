//! Pantry Crawler main entry point
//!
//! This is the command-line interface for the grocery catalog crawler.

use anyhow::Context;
use clap::Parser;
use pantry_crawler::config::{load_config_with_hash, Config};
use pantry_crawler::crawler::{
    enumerate_sitemap_files, list_sitemap_links, run_crawl, CrawlMode, PageFetcher, SitemapCache,
};
use pantry_crawler::output::{load_statistics, print_report, print_statistics};
use pantry_crawler::storage::SqliteProductStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pantry Crawler: a grocery catalog crawler and product scraper
///
/// Discovers product pages by following links from category seeds (default)
/// or by reading the shop's product sitemaps, scrapes each product and keeps
/// a SQLite product table up to date.
#[derive(Parser, Debug)]
#[command(name = "pantry-crawler")]
#[command(version)]
#[command(about = "A grocery catalog crawler and product scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discover products from the sitemap files instead of following links
    #[arg(long)]
    sitemap: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "list_sitemap_links"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_sitemap_links"])]
    stats: bool,

    /// Print every product URL listed in the sitemap files and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list_sitemap_links: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mode = if cli.sitemap {
        CrawlMode::Sitemap
    } else {
        CrawlMode::Links
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, mode);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.list_sitemap_links {
        handle_list_sitemap_links(&config).await?;
    } else {
        handle_crawl(&config, mode, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pantry_crawler=info,warn"),
            1 => EnvFilter::new("pantry_crawler=debug,info"),
            2 => EnvFilter::new("pantry_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, mode: CrawlMode) {
    println!("=== Pantry Crawler Dry Run ===\n");

    println!("Mode: {}", mode.as_str());
    println!(
        "Freshness threshold: {}h",
        mode.freshness_threshold_hours(config)
    );

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  When saturated: {}", config.crawler.saturation.as_str());

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Max retries: {}", config.fetcher.max_retries);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    match mode {
        CrawlMode::Links => {
            println!("\nSeeds ({}):", config.crawler.seeds.len());
            for seed in &config.crawler.seeds {
                println!("  - {}", seed);
            }
        }
        CrawlMode::Sitemap => {
            let files = enumerate_sitemap_files(&config.sitemap);
            println!("\nSitemap files ({}):", files.len());
            for file in &files {
                println!("  - {}", file);
            }
        }
    }

    println!(
        "\nGenuine product categories ({}):",
        config.site.genuine_category_paths.len()
    );
    for path in &config.site.genuine_category_paths {
        println!("  - {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteProductStore::new(Path::new(&config.output.database_path))
        .context("Failed to open product database")?;
    let stats = load_statistics(&store, 5)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list-sitemap-links mode: prints every sitemap product URL
async fn handle_list_sitemap_links(config: &Config) -> anyhow::Result<()> {
    let fetcher = PageFetcher::new(&config.fetcher).context("Failed to build HTTP client")?;
    let cache = SitemapCache::new();

    let links = list_sitemap_links(&config.sitemap, &cache, &fetcher).await;
    for link in &links {
        println!("{}", link);
    }
    tracing::info!(
        "{} links from {} sitemap files",
        links.len(),
        cache.len()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, mode: CrawlMode, config_hash: &str) -> anyhow::Result<()> {
    match mode {
        CrawlMode::Links => tracing::info!(
            "Following links from {} seeds (max depth {})",
            config.crawler.seeds.len(),
            config.crawler.max_depth
        ),
        CrawlMode::Sitemap => tracing::info!(
            "Reading sitemap files {}..={}",
            config.sitemap.first_index,
            config.sitemap.last_index
        ),
    }

    let report = run_crawl(config, mode, config_hash)
        .await
        .context("Crawl failed")?;
    print_report(&report);

    Ok(())
}
