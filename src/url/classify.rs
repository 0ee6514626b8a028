use url::Url;

/// Path segment the catalog uses for product detail pages
const PRODUCT_MARKER: &str = "/p";

/// Returns true if the string is an absolute http or https URL
///
/// Relative anchors, `mailto:`, `javascript:` and unparsable strings are
/// rejected silently; they are routine on catalog pages.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Returns true if the URL looks like a product detail page
///
/// Product pages end in a `/p` segment, optionally followed by a bare `#`.
/// This is a syntactic pre-filter only; the fetched page still has to pass
/// the breadcrumb check.
pub fn is_product_page(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    let trimmed = trimmed.strip_suffix('#').unwrap_or(trimmed);
    trimmed.ends_with(PRODUCT_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(is_valid_url("https://www.auchan.ro/bacanie/c"));
        assert!(is_valid_url("http://localhost:8080/a/p"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!is_valid_url("/bacanie/c"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("javascript:void(0)"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_product_page_marker() {
        assert!(is_product_page("https://www.auchan.ro/branza-cottage-180g/p"));
        assert!(is_product_page("https://www.auchan.ro/branza-cottage-180g/p#"));
    }

    #[test]
    fn test_not_product_page() {
        assert!(!is_product_page("https://www.auchan.ro/bacanie/c"));
        assert!(!is_product_page("https://www.auchan.ro/p/other"));
        assert!(!is_product_page("https://www.auchan.ro/shop"));
        assert!(!is_product_page("https://www.auchan.ro/branza/p#reviews"));
    }
}
