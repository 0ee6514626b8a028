use scraper::Html;

use super::{ExtractResult, SiteSelectors};

/// Decides whether a fetched product page is a real catalog product
///
/// The catalog keeps serving discontinued items under their product URL,
/// but those pages lose their breadcrumb. A page counts as genuine only if
/// its top-level breadcrumb anchor points into one of the configured
/// department paths.
#[derive(Debug, Clone)]
pub struct GenuineProductClassifier {
    category_paths: Vec<String>,
    selectors: SiteSelectors,
}

impl GenuineProductClassifier {
    /// Creates a classifier accepting breadcrumbs that contain any of `category_paths`
    pub fn new(category_paths: Vec<String>) -> ExtractResult<Self> {
        Ok(Self {
            category_paths,
            selectors: SiteSelectors::compile()?,
        })
    }

    /// Returns true if the document carries a breadcrumb into a known department
    ///
    /// Pages without a breadcrumb are not products; this never errors.
    pub fn is_genuine_product(&self, document: &Html) -> bool {
        document
            .select(&self.selectors.breadcrumb_root)
            .filter_map(|anchor| anchor.value().attr("href"))
            .any(|href| self.matches_category(href))
    }

    fn matches_category(&self, href: &str) -> bool {
        self.category_paths
            .iter()
            .any(|path| !path.is_empty() && href.contains(path.as_str()))
    }
}
