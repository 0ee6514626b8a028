//! HTML link extraction
//!
//! Listing pages are parsed only for their `<a href>` targets; product
//! fields are handled by the scrape module.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every followable link from a page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only anchors
/// - Anything that does not resolve to http or https
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Returns
///
/// Absolute URLs in document order (duplicates included)
///
/// # Example
///
/// ```
/// use pantry_crawler::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/bacanie/c">Bacanie</a></body></html>"#;
/// let base_url = Url::parse("https://www.auchan.ro/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec!["https://www.auchan.ro/bacanie/c".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Same page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.auchan.ro/bacanie/c").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://other.com/page".to_string()]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<a href="/branza-cottage-180g/p">Cottage</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://www.auchan.ro/branza-cottage-180g/p".to_string()]);
    }

    #[test]
    fn test_product_marker_fragment_kept() {
        let html = r##"<a href="/paine-alba/p#">Paine</a>"##;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://www.auchan.ro/paine-alba/p#".to_string()]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+40123456789">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
        "#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_and_fragment_only() {
        let html = r##"
            <a href="/catalog.pdf" download>Download</a>
            <a href="#top">Top</a>
            <a href="">Empty</a>
        "##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <a href="/lactate/c">Valid</a>
            <a href="javascript:alert('no')">Invalid</a>
            <a href="/bacanie/ulei/c">Valid</a>
            <link rel="canonical" href="https://www.auchan.ro/ignored" />
        "#;
        let links = extract_links(html, &base_url());
        assert_eq!(links.len(), 2);
    }
}
