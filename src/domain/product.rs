//! Product records and their category partitions.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Catalog categories. Each category owns one storage partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fashion,
    Phones,
    Laptops,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Fashion, Category::Phones, Category::Laptops];

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Fashion => "fashion",
            Category::Phones => "phones",
            Category::Laptops => "laptops",
        }
    }

    /// Partition key, `products_<category>`.
    pub fn storage_key(&self) -> String {
        format!("products_{}", self.slug())
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.slug() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FashionAttrs {
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub material: Option<String>,
    pub style: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneAttrs {
    pub storage: Option<String>,
    pub ram: Option<String>,
    pub display: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaptopAttrs {
    pub processor: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub display: Option<String>,
}

/// Category-specific attribute bag. The variant must match the product's
/// category; `CatalogStore::save` repairs mismatches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryAttrs {
    Fashion(FashionAttrs),
    Phones(PhoneAttrs),
    Laptops(LaptopAttrs),
}

impl CategoryAttrs {
    pub fn category(&self) -> Category {
        match self {
            CategoryAttrs::Fashion(_) => Category::Fashion,
            CategoryAttrs::Phones(_) => Category::Phones,
            CategoryAttrs::Laptops(_) => Category::Laptops,
        }
    }

    pub fn empty(category: Category) -> Self {
        match category {
            Category::Fashion => CategoryAttrs::Fashion(FashionAttrs::default()),
            Category::Phones => CategoryAttrs::Phones(PhoneAttrs::default()),
            Category::Laptops => CategoryAttrs::Laptops(LaptopAttrs::default()),
        }
    }

    /// Headline spec line shown in product tables, e.g. `Sizes: S,M,L`.
    pub fn spec_summary(&self) -> Option<String> {
        match self {
            CategoryAttrs::Fashion(a) => a.sizes.as_ref().map(|s| format!("Sizes: {s}")),
            CategoryAttrs::Phones(a) => a.storage.as_ref().map(|s| format!("Storage: {s}")),
            CategoryAttrs::Laptops(a) => a.processor.as_ref().map(|p| format!("Processor: {p}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub category: Category,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
    pub attrs: CategoryAttrs,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Stock badge text. Independent of `status`.
    pub fn stock_label(&self) -> &'static str {
        if self.is_in_stock() {
            "In Stock"
        } else {
            "Out of Stock"
        }
    }

    /// A struck-through original price above the sale price.
    pub fn has_discount(&self) -> bool {
        self.original_price.map_or(false, |orig| orig > self.price)
    }
}

/// Raw admin-form payload. Numeric fields arrive as text and are coerced on
/// save; anything unparseable becomes zero.
#[derive(Clone, Debug)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub category: Category,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub stock: String,
    pub status: ProductStatus,
    pub attrs: Option<CategoryAttrs>,
}

impl ProductDraft {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            id: None,
            category,
            name: name.into(),
            price: String::new(),
            original_price: None,
            description: None,
            image: None,
            stock: String::new(),
            status: ProductStatus::Active,
            attrs: None,
        }
    }

    pub(crate) fn coerce_price(&self) -> Decimal {
        parse_amount(&self.price)
    }

    pub(crate) fn coerce_original_price(&self) -> Option<Decimal> {
        self.original_price.as_deref().map(parse_amount)
    }

    pub(crate) fn coerce_stock(&self) -> u32 {
        match self.stock.trim().parse::<u32>() {
            Ok(stock) => stock,
            Err(_) => {
                if !self.stock.trim().is_empty() {
                    warn!(raw = %self.stock, "stock did not parse, coerced to 0");
                }
                0
            }
        }
    }
}

fn parse_amount(raw: &str) -> Decimal {
    match raw.trim().parse::<Decimal>() {
        Ok(value) => value,
        Err(_) => {
            if !raw.trim().is_empty() {
                warn!(raw, "amount did not parse, coerced to 0");
            }
            Decimal::ZERO
        }
    }
}

/// Short random id token, unique with overwhelming probability.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_storage_key() {
        assert_eq!(Category::Fashion.storage_key(), "products_fashion");
        assert_eq!(Category::parse("laptops"), Some(Category::Laptops));
        assert_eq!(Category::parse("toys"), None);
    }

    #[test]
    fn test_draft_coercion() {
        let mut draft = ProductDraft::new(Category::Fashion, "Tee");
        draft.price = " 299 ".into();
        draft.stock = "50".into();
        assert_eq!(draft.coerce_price(), Decimal::from(299));
        assert_eq!(draft.coerce_stock(), 50);

        draft.price = "not-a-number".into();
        draft.stock = "-3".into();
        assert_eq!(draft.coerce_price(), Decimal::ZERO);
        assert_eq!(draft.coerce_stock(), 0);
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(id, id.to_lowercase());
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_stock_and_discount_badges() {
        let mut product = Product {
            id: "p1".into(),
            category: Category::Fashion,
            name: "Tee".into(),
            price: Decimal::from(299),
            original_price: Some(Decimal::from(399)),
            description: None,
            image: None,
            stock: 5,
            status: ProductStatus::Active,
            attrs: CategoryAttrs::empty(Category::Fashion),
            created_at: Utc::now(),
        };
        assert_eq!(product.stock_label(), "In Stock");
        assert!(product.has_discount());

        product.stock = 0;
        product.original_price = Some(Decimal::from(299));
        assert_eq!(product.stock_label(), "Out of Stock");
        assert!(!product.has_discount());
    }

    #[test]
    fn test_product_json_shape() {
        let product = Product {
            id: "abc123def".into(),
            category: Category::Phones,
            name: "Phone".into(),
            price: Decimal::from(12999),
            original_price: None,
            description: None,
            image: None,
            stock: 3,
            status: ProductStatus::Active,
            attrs: CategoryAttrs::Phones(PhoneAttrs {
                storage: Some("128GB".into()),
                ..PhoneAttrs::default()
            }),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["category"], "phones");
        assert_eq!(value["attrs"]["phones"]["storage"], "128GB");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("originalPrice").is_none());

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_spec_summary_per_category() {
        let fashion = CategoryAttrs::Fashion(FashionAttrs {
            sizes: Some("S,M,L".into()),
            ..FashionAttrs::default()
        });
        assert_eq!(fashion.spec_summary().as_deref(), Some("Sizes: S,M,L"));
        assert_eq!(CategoryAttrs::empty(Category::Laptops).spec_summary(), None);
    }
}
