//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a miniature catalog and run full
//! crawls end-to-end against a temporary SQLite database.

use pantry_crawler::config::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, SaturationPolicy, SiteConfig,
    SitemapConfig,
};
use pantry_crawler::crawler::{run_crawl, CrawlMode};
use pantry_crawler::storage::{ProductStore, RunStatus, SqliteProductStore};
use pantry_crawler::TaskOutcome;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every URL at the mock server
fn create_test_config(base_url: &str, seeds: &[&str], db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth: 3,
            max_concurrent_fetches: 4,
            saturation: SaturationPolicy::Wait,
            freshness_threshold_hours: 12,
            seeds: seeds.iter().map(|s| format!("{}{}", base_url, s)).collect(),
        },
        sitemap: SitemapConfig {
            url_template: format!("{}/sitemap/product-{{index}}.xml", base_url),
            first_index: 0,
            last_index: 1,
            freshness_threshold_hours: 24,
        },
        fetcher: FetcherConfig {
            user_agent: "TestBot/1.0".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
            max_retries: 0,
            retry_backoff_ms: 1,
        },
        site: SiteConfig {
            genuine_category_paths: vec!["/lactate".to_string(), "/bacanie".to_string()],
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().to_string(),
        },
    }
}

/// Renders a product page with a department breadcrumb
fn product_page(department: &str, name: &str, price: &str, kcal: &str) -> String {
    format!(
        r#"<html><body>
            <a class="vtex-breadcrumb-1-x-link--productBreadcrumb--1" href="/{department}/c">Dept</a>
            <a class="vtex-breadcrumb-1-x-link--productBreadcrumb--3" href="/{department}/sub/c">Branzeturi</a>
            <h1><span class="vtex-store-components-3-x-productBrand--productPage">{name}</span></h1>
            <span class="vtex-product-price-1-x-currencyContainer--pdp">{price}</span>
            <span class="vtex-product-specifications-1-x-specificationValue--first vtex-product-specifications-1-x-specificationValue--last"
                  data-specification-name="Kcal pe 100g sau 100ml" data-specification-value="{kcal}">{kcal}</span>
        </body></html>"#
    )
}

/// Renders a product URL that still resolves but lost its breadcrumb
fn soft_404_page(name: &str) -> String {
    format!(
        r#"<html><body>
            <h1><span class="vtex-store-components-3-x-productBrand--productPage">{name}</span></h1>
            <span class="vtex-product-price-1-x-currencyContainer--pdp">1,00 lei</span>
        </body></html>"#
    )
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a small catalog: one department listing two products and a withdrawn one
async fn mount_catalog(server: &MockServer) {
    serve(
        server,
        "/lactate/c",
        r#"<html><body>
            <a href="/lactate/branzeturi/c">Branzeturi</a>
            <a href="/branza-cottage-180g/p">Cottage</a>
            <a href="/iaurt-grecesc/p#">Iaurt</a>
            <a href="/produs-retras/p">Retras</a>
            <a href="javascript:void(0)">Nothing</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    serve(
        server,
        "/lactate/branzeturi/c",
        r#"<a href="/branza-cottage-180g/p">Cottage again</a>"#.to_string(),
    )
    .await;
    serve(
        server,
        "/branza-cottage-180g/p",
        product_page("lactate", "Cottage Cheese 180g", "8,49 lei", "98"),
    )
    .await;
    serve(
        server,
        "/iaurt-grecesc/p",
        product_page("lactate", "Iaurt Grecesc 150g", "5,20 lei", "120"),
    )
    .await;
    serve(server, "/produs-retras/p", soft_404_page("Produs Retras")).await;
}

fn open_store(db_path: &Path) -> SqliteProductStore {
    SqliteProductStore::new(db_path).expect("Failed to open database")
}

#[tokio::test]
async fn test_link_crawl_stores_genuine_products() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&server.uri(), &["/lactate/c"], &db_path);

    let report = run_crawl(&config, CrawlMode::Links, "hash-1")
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(TaskOutcome::Inserted), 2);
    assert_eq!(report.count(TaskOutcome::NotProduct), 1);
    assert_eq!(report.total(), 3);

    let store = open_store(&db_path);
    assert_eq!(store.count_products().unwrap(), 2);

    let cottage = store
        .find_by_name("Cottage Cheese 180g")
        .unwrap()
        .expect("Cottage cheese not stored");
    assert_eq!(cottage.record.price, Decimal::from_str("8.49").unwrap());
    assert_eq!(cottage.record.category, "Branzeturi");
    assert_eq!(cottage.record.nutrition.kcal_per_100g, Some(Decimal::from(98)));

    assert!(store.find_by_name("Produs Retras").unwrap().is_none());

    let runs = store.recent_runs(1).unwrap();
    assert_eq!(runs[0].mode, "links");
    assert_eq!(runs[0].config_hash, "hash-1");
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].counts.inserted, 2);
}

#[tokio::test]
async fn test_second_crawl_skips_fresh_products() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&server.uri(), &["/lactate/c"], &db_path);

    run_crawl(&config, CrawlMode::Links, "hash-1").await.unwrap();
    let second = run_crawl(&config, CrawlMode::Links, "hash-1").await.unwrap();

    assert_eq!(second.count(TaskOutcome::Inserted), 0);
    assert_eq!(second.count(TaskOutcome::Skipped), 2);
    assert_eq!(open_store(&db_path).count_products().unwrap(), 2);
}

#[tokio::test]
async fn test_zero_threshold_refreshes_products() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let mut config = create_test_config(&server.uri(), &["/lactate/c"], &db_path);

    run_crawl(&config, CrawlMode::Links, "hash-1").await.unwrap();

    config.crawler.freshness_threshold_hours = 0;
    let refresh = run_crawl(&config, CrawlMode::Links, "hash-2").await.unwrap();

    assert_eq!(refresh.count(TaskOutcome::Updated), 2);
    assert_eq!(open_store(&db_path).count_products().unwrap(), 2);
}

#[tokio::test]
async fn test_depth_limit_is_respected() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/bacanie/c",
        r#"<a href="/bacanie/ulei/c">Ulei</a><a href="/zahar-1kg/p">Zahar</a>"#.to_string(),
    )
    .await;
    serve(
        &server,
        "/bacanie/ulei/c",
        r#"<a href="/bacanie/ulei/floarea-soarelui/c">Floarea soarelui</a><a href="/ulei-1l/p">Ulei</a>"#
            .to_string(),
    )
    .await;
    serve(
        &server,
        "/zahar-1kg/p",
        product_page("bacanie", "Zahar 1kg", "4,99 lei", "400"),
    )
    .await;
    serve(
        &server,
        "/ulei-1l/p",
        product_page("bacanie", "Ulei 1L", "9,99 lei", "900"),
    )
    .await;

    // Third level is never fetched with max_depth = 3
    Mock::given(method("GET"))
        .and(path("/bacanie/ulei/floarea-soarelui/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/deep/p">Deep</a>"#))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&server.uri(), &["/bacanie/c"], &db_path);

    let report = run_crawl(&config, CrawlMode::Links, "hash-1").await.unwrap();

    assert_eq!(report.count(TaskOutcome::Inserted), 2);
    assert!(report.max_depth_dispatched <= 3);
    assert!(open_store(&db_path).find_by_name("Ulei 1L").unwrap().is_some());
}

#[tokio::test]
async fn test_sitemap_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/sitemap/product-0.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{base}/branza-cottage-180g/p</loc></url>
              <url><loc>{base}/produs-retras/p</loc></url>
            </urlset>"#
        ),
    )
    .await;
    serve(
        &server,
        "/sitemap/product-1.xml",
        format!(
            r#"<urlset>
              <url><loc>{base}/iaurt-grecesc/p</loc></url>
              <url><loc>{base}/branza-cottage-180g/p</loc></url>
            </urlset>"#
        ),
    )
    .await;
    serve(
        &server,
        "/branza-cottage-180g/p",
        product_page("lactate", "Cottage Cheese 180g", "8,49 lei", "98"),
    )
    .await;
    serve(
        &server,
        "/iaurt-grecesc/p",
        product_page("lactate", "Iaurt Grecesc 150g", "5,20 lei", "120"),
    )
    .await;
    serve(&server, "/produs-retras/p", soft_404_page("Produs Retras")).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&base, &[], &db_path);

    let report = run_crawl(&config, CrawlMode::Sitemap, "hash-1").await.unwrap();

    assert_eq!(report.count(TaskOutcome::Inserted), 2);
    assert_eq!(report.count(TaskOutcome::NotProduct), 1);
    assert_eq!(report.total(), 3);
    assert_eq!(report.max_depth_dispatched, 1);

    let runs = open_store(&db_path).recent_runs(1).unwrap();
    assert_eq!(runs[0].mode, "sitemap");
}

#[tokio::test]
async fn test_missing_sitemap_file_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/sitemap/product-1.xml",
        format!("<urlset><url><loc>{base}/iaurt-grecesc/p</loc></url></urlset>"),
    )
    .await;
    serve(
        &server,
        "/iaurt-grecesc/p",
        product_page("lactate", "Iaurt Grecesc 150g", "5,20 lei", "120"),
    )
    .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&base, &[], &db_path);

    let report = run_crawl(&config, CrawlMode::Sitemap, "hash-1").await.unwrap();
    assert_eq!(report.count(TaskOutcome::Inserted), 1);
}

#[tokio::test]
async fn test_fetch_failures_do_not_abort_crawl() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/lactate/c",
        r#"<a href="/broken/p">Broken</a><a href="/iaurt-grecesc/p">Iaurt</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken/p"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    serve(
        &server,
        "/iaurt-grecesc/p",
        product_page("lactate", "Iaurt Grecesc 150g", "5,20 lei", "120"),
    )
    .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("products.db");
    let config = create_test_config(&server.uri(), &["/lactate/c"], &db_path);

    let report = run_crawl(&config, CrawlMode::Links, "hash-1").await.unwrap();

    assert_eq!(report.count(TaskOutcome::FetchFailed), 1);
    assert_eq!(report.count(TaskOutcome::Inserted), 1);

    let runs = open_store(&db_path).recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].counts.failed, 1);
}
