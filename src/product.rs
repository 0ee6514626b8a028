//! Structured product data produced by the scraper
//!
//! A [`ProductRecord`] has no identity of its own; the product store assigns
//! an id on insert and stamps the modification time, yielding a
//! [`StoredProduct`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Nutrition facts per 100g (or 100ml), all optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nutrition {
    pub kcal_per_100g: Option<Decimal>,
    pub kj_per_100g: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub saturated_fats: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub sugars: Option<Decimal>,
    pub salt: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub proteins: Option<Decimal>,
}

impl Nutrition {
    /// Returns true if no nutrition fact is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A scraped product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    /// Product name, the reconciliation key
    pub name: String,

    /// Breadcrumb category text (may be empty)
    pub category: String,

    /// Shelf price, two fraction digits
    pub price: Decimal,

    pub product_type: Option<String>,
    pub speciality: Option<String>,
    pub storage_conditions: Option<String>,
    pub weight: Option<Decimal>,
    pub shelf_life: Option<String>,

    /// Ingredients list as free text
    pub ingredients: Option<String>,

    pub nutrition: Nutrition,
}

impl ProductRecord {
    /// Starts a builder from the mandatory fields
    pub fn builder(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> ProductBuilder {
        ProductBuilder::new(name, category, price)
    }
}

/// A product as persisted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProduct {
    pub id: i64,
    pub record: ProductRecord,
    pub last_modified: DateTime<Utc>,
}

/// Builder for [`ProductRecord`]
///
/// Optional setters share the `fn(&mut ProductBuilder, T) -> &mut ProductBuilder`
/// shape so they can be stored in the scraper's label table.
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    record: ProductRecord,
}

impl ProductBuilder {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Decimal) -> Self {
        Self {
            record: ProductRecord {
                name: name.into(),
                category: category.into(),
                price: price.round_dp(2),
                product_type: None,
                speciality: None,
                storage_conditions: None,
                weight: None,
                shelf_life: None,
                ingredients: None,
                nutrition: Nutrition::default(),
            },
        }
    }

    pub fn product_type(&mut self, value: String) -> &mut Self {
        self.record.product_type = Some(value);
        self
    }

    pub fn speciality(&mut self, value: String) -> &mut Self {
        self.record.speciality = Some(value);
        self
    }

    pub fn storage_conditions(&mut self, value: String) -> &mut Self {
        self.record.storage_conditions = Some(value);
        self
    }

    pub fn weight(&mut self, value: Decimal) -> &mut Self {
        self.record.weight = Some(value);
        self
    }

    pub fn shelf_life(&mut self, value: String) -> &mut Self {
        self.record.shelf_life = Some(value);
        self
    }

    pub fn ingredients(&mut self, value: String) -> &mut Self {
        self.record.ingredients = Some(value);
        self
    }

    pub fn kcal_per_100g(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.kcal_per_100g = Some(value);
        self
    }

    pub fn kj_per_100g(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.kj_per_100g = Some(value);
        self
    }

    pub fn fats(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.fats = Some(value);
        self
    }

    pub fn saturated_fats(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.saturated_fats = Some(value);
        self
    }

    pub fn carbohydrates(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.carbohydrates = Some(value);
        self
    }

    pub fn sugars(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.sugars = Some(value);
        self
    }

    pub fn salt(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.salt = Some(value);
        self
    }

    pub fn fiber(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.fiber = Some(value);
        self
    }

    pub fn proteins(&mut self, value: Decimal) -> &mut Self {
        self.record.nutrition.proteins = Some(value);
        self
    }

    pub fn build(self) -> ProductRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_builder_rounds_price() {
        let record = ProductRecord::builder("Lapte", "Lactate", Decimal::from_str("5.999").unwrap())
            .build();
        assert_eq!(record.price, Decimal::from_str("6.00").unwrap());
    }

    #[test]
    fn test_builder_sets_optional_fields() {
        let mut builder = ProductRecord::builder("Paine", "Brutarie", Decimal::new(450, 2));
        builder
            .product_type("Paine".to_string())
            .kcal_per_100g(Decimal::from(250))
            .salt(Decimal::new(12, 1));
        let record = builder.build();

        assert_eq!(record.product_type.as_deref(), Some("Paine"));
        assert_eq!(record.nutrition.kcal_per_100g, Some(Decimal::from(250)));
        assert_eq!(record.nutrition.salt, Some(Decimal::new(12, 1)));
        assert_eq!(record.nutrition.fats, None);
    }

    #[test]
    fn test_nutrition_is_empty() {
        let mut nutrition = Nutrition::default();
        assert!(nutrition.is_empty());
        nutrition.sugars = Some(Decimal::ONE);
        assert!(!nutrition.is_empty());
    }
}
