use std::str::FromStr;

use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::selectors::{PROPERTY_NAME_ATTR, PROPERTY_VALUE_ATTR};
use super::{ExtractError, ExtractResult, SiteSelectors};
use crate::product::{ProductBuilder, ProductRecord};

type TextSetter = fn(&mut ProductBuilder, String) -> &mut ProductBuilder;
type NumberSetter = fn(&mut ProductBuilder, Decimal) -> &mut ProductBuilder;

/// How a recognised property label is applied to the builder
#[derive(Clone, Copy)]
enum PropertySetter {
    Text(TextSetter),
    Number(NumberSetter),
}

/// Property labels as they appear in the specification table, and their setters
const PROPERTY_FIELDS: &[(&str, PropertySetter)] = &[
    ("Tip Produs", PropertySetter::Text(ProductBuilder::product_type)),
    ("Specialitate", PropertySetter::Text(ProductBuilder::speciality)),
    ("Conditii de pastrare", PropertySetter::Text(ProductBuilder::storage_conditions)),
    ("Greutate", PropertySetter::Number(ProductBuilder::weight)),
    ("Termen de valabilitate", PropertySetter::Text(ProductBuilder::shelf_life)),
    ("Ingrediente", PropertySetter::Text(ProductBuilder::ingredients)),
    ("Kcal pe 100g sau 100ml", PropertySetter::Number(ProductBuilder::kcal_per_100g)),
    ("KJ pe 100g sau 100ml", PropertySetter::Number(ProductBuilder::kj_per_100g)),
    ("Grasimi (g sau ml)", PropertySetter::Number(ProductBuilder::fats)),
    ("Acizi grasi saturati (g sau ml)", PropertySetter::Number(ProductBuilder::saturated_fats)),
    ("Glucide (g sau ml)", PropertySetter::Number(ProductBuilder::carbohydrates)),
    ("Zaharuri (g sau ml)", PropertySetter::Number(ProductBuilder::sugars)),
    ("Fibre (g sau ml)", PropertySetter::Number(ProductBuilder::fiber)),
    ("Sare (g sau ml)", PropertySetter::Number(ProductBuilder::salt)),
    ("Proteine (g sau ml)", PropertySetter::Number(ProductBuilder::proteins)),
];

fn lookup_setter(label: &str) -> Option<PropertySetter> {
    PROPERTY_FIELDS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, setter)| *setter)
}

/// Builds [`ProductRecord`]s from product page documents
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    selectors: SiteSelectors,
}

impl ProductExtractor {
    pub fn new() -> ExtractResult<Self> {
        Ok(Self {
            selectors: SiteSelectors::compile()?,
        })
    }

    /// Extracts a product record from a parsed product page
    ///
    /// # Extraction Rules
    ///
    /// 1. Name and price are mandatory. If the name is empty or the price
    ///    cannot be parsed, the page yields `Ok(None)`.
    /// 2. Every row of the specification table whose label is known is
    ///    applied to the record. Unknown labels and empty text values are
    ///    ignored; an empty numeric value is an invalid number.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - A complete record
    /// * `Ok(None)` - The page has no usable name or price
    /// * `Err(ExtractError::InvalidNumber)` - A numeric property could not be
    ///   parsed; the whole record is discarded
    pub fn extract(&self, document: &Html) -> ExtractResult<Option<ProductRecord>> {
        let name = match self.product_name(document) {
            Some(name) => name,
            None => return Ok(None),
        };

        let price = match self.product_price(document) {
            Some(price) => price,
            None => return Ok(None),
        };

        let category = self.product_category(document);
        let mut builder = ProductBuilder::new(name, category, price);

        for property in document.select(&self.selectors.property) {
            let label = property.value().attr(PROPERTY_NAME_ATTR).unwrap_or("").trim();
            let value = property.value().attr(PROPERTY_VALUE_ATTR).unwrap_or("").trim();

            let setter = match lookup_setter(label) {
                Some(setter) => setter,
                None => continue,
            };

            match setter {
                PropertySetter::Text(_) if value.is_empty() => continue,
                PropertySetter::Text(set) => {
                    set(&mut builder, value.to_string());
                }
                PropertySetter::Number(set) => {
                    set(&mut builder, parse_decimal(label, value)?);
                }
            }

            debug!("  {}: {}", label, value);
        }

        Ok(Some(builder.build()))
    }

    fn product_name(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selectors.name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
    }

    fn product_price(&self, document: &Html) -> Option<Decimal> {
        document
            .select(&self.selectors.price)
            .next()
            .map(element_text)
            .and_then(|text| parse_price(&text))
    }

    fn product_category(&self, document: &Html) -> String {
        document
            .select(&self.selectors.category)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Collects an element's text with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a shelf price such as `"8,49 lei"` or `"1.299,00 lei"`
///
/// Leading text is skipped up to the first digit; the number ends at the
/// first character that is not a digit, separator or whitespace. A `,` is
/// the decimal separator when present, in which case `.` is a thousands
/// separator. The result is rounded to two fraction digits.
///
/// Returns `None` when no number can be read.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || c.is_whitespace())
        .filter(|c| !c.is_whitespace())
        .collect();
    let number = number.trim_end_matches([',', '.']);

    let canonical = if number.contains(',') {
        number.replace('.', "").replace(',', ".")
    } else {
        number.to_string()
    };

    Decimal::from_str(&canonical).ok().map(|price| price.round_dp(2))
}

/// Parses a numeric property value, accepting `,` as the decimal separator
pub fn parse_decimal(label: &str, value: &str) -> ExtractResult<Decimal> {
    let canonical = value.trim().replace(',', ".");
    Decimal::from_str(&canonical).map_err(|_| ExtractError::InvalidNumber {
        label: label.to_string(),
        value: value.to_string(),
    })
}
