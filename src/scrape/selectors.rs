use scraper::Selector;

use super::{ExtractError, ExtractResult};

/// Top-level breadcrumb anchor; its href names the catalog department
const BREADCRUMB_ROOT: &str = "a.vtex-breadcrumb-1-x-link--productBreadcrumb--1";

/// Third breadcrumb level, used as the product category
const BREADCRUMB_CATEGORY: &str = ".vtex-breadcrumb-1-x-link--productBreadcrumb--3";

const PRODUCT_NAME: &str = "span.vtex-store-components-3-x-productBrand--productPage, \
     .vtex-store-components-3-x-productBrand--productPage span";

const PRODUCT_PRICE: &str = ".vtex-product-price-1-x-currencyContainer--pdp";

const PRODUCT_PROPERTY: &str = ".vtex-product-specifications-1-x-specificationValue--first\
     .vtex-product-specifications-1-x-specificationValue--last";

/// Attribute holding a property's label
pub const PROPERTY_NAME_ATTR: &str = "data-specification-name";

/// Attribute holding a property's value
pub const PROPERTY_VALUE_ATTR: &str = "data-specification-value";

/// Compiled CSS selectors for the catalog's product page markup
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub breadcrumb_root: Selector,
    pub category: Selector,
    pub name: Selector,
    pub price: Selector,
    pub property: Selector,
}

impl SiteSelectors {
    /// Compiles the built-in selectors
    pub fn compile() -> ExtractResult<Self> {
        Ok(Self {
            breadcrumb_root: parse(BREADCRUMB_ROOT)?,
            category: parse(BREADCRUMB_CATEGORY)?,
            name: parse(PRODUCT_NAME)?,
            price: parse(PRODUCT_PRICE)?,
            property: parse(PRODUCT_PROPERTY)?,
        })
    }
}

fn parse(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|_| ExtractError::Selector(selector.to_string()))
}
