//! Category-partitioned product catalog with a combined storefront view.
//!
//! Each category owns one storage partition; every mutation also
//! resynchronises the combined cross-category view that storefront pages
//! browse and search. Storage failures degrade to empty reads or dropped
//! writes; a broken backing store must never take the page down with it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::events::CatalogEvent;
use crate::domain::product::{
    generate_id, Category, CategoryAttrs, FashionAttrs, Product, ProductDraft, ProductStatus,
};
use crate::storage::{self, keys, StoragePort};

pub struct CatalogStore {
    storage: Arc<dyn StoragePort>,
    events: Vec<CatalogEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub per_category: Vec<(Category, usize)>,
    pub total: usize,
}

impl CatalogStats {
    pub fn count_for(&self, category: Category) -> usize {
        self.per_category
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Price band with an exclusive lower and inclusive upper bound, matching
/// the storefront's range controls (0–500, 500–1000, 1000–2000, 2000+).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceBand {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceBand {
    pub fn up_to(max: impl Into<Decimal>) -> Self {
        Self {
            min: None,
            max: Some(max.into()),
        }
    }

    pub fn between(min: impl Into<Decimal>, max: impl Into<Decimal>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn above(min: impl Into<Decimal>) -> Self {
        Self {
            min: Some(min.into()),
            max: None,
        }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        self.min.map_or(true, |min| price > min) && self.max.map_or(true, |max| price <= max)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFilter {
    /// Substring match against the fashion material attribute.
    pub material: Option<String>,
    pub price: Option<PriceBand>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Name,
    PriceLowHigh,
    PriceHighLow,
    Newest,
}

impl CatalogStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            storage,
            events: Vec::new(),
        }
    }

    /// All products in a category partition. A partition that has never
    /// been written returns the built-in seed set; an unreadable one
    /// returns empty.
    pub fn list(&self, category: Category) -> Vec<Product> {
        match self.storage.get(&category.storage_key()) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(category = %category, %err, "unreadable partition, treating as empty");
                Vec::new()
            }),
            Ok(None) => seed_products(category),
            Err(err) => {
                warn!(category = %category, %err, "partition read failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// The denormalized cross-category view storefront pages browse.
    pub fn combined(&self) -> Vec<Product> {
        storage::get_json(self.storage.as_ref(), keys::COMBINED_PRODUCTS).unwrap_or_default()
    }

    /// Upsert a product by id within its category partition. A draft
    /// without an id gets a fresh one; an update keeps the original
    /// creation timestamp.
    pub fn save(&mut self, draft: ProductDraft) -> Product {
        let mut partition = self.list(draft.category);

        let id = draft
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id);
        let attrs = match draft.attrs.clone() {
            Some(attrs) if attrs.category() == draft.category => attrs,
            Some(_) => {
                warn!(category = %draft.category, "attribute bag does not match category, dropped");
                CategoryAttrs::empty(draft.category)
            }
            None => CategoryAttrs::empty(draft.category),
        };
        let existing = partition.iter().position(|p| p.id == id);
        let created_at = existing
            .map(|i| partition[i].created_at)
            .unwrap_or_else(Utc::now);

        let product = Product {
            id,
            category: draft.category,
            name: draft.name.clone(),
            price: draft.coerce_price(),
            original_price: draft.coerce_original_price(),
            description: draft.description.clone(),
            image: draft.image.clone(),
            stock: draft.coerce_stock(),
            status: draft.status,
            attrs,
            created_at,
        };

        match existing {
            Some(i) => partition[i] = product.clone(),
            None => partition.push(product.clone()),
        }
        self.write_partition(draft.category, &partition);
        self.sync_combined();
        self.events.push(CatalogEvent::Saved {
            id: product.id.clone(),
            category: product.category,
            name: product.name.clone(),
        });
        product
    }

    /// Remove a product from its partition and from the combined view.
    /// Deleting an absent id is a silent no-op.
    pub fn delete(&mut self, id: &str, category: Category) {
        let mut partition = self.list(category);
        let before = partition.len();
        partition.retain(|p| p.id != id);
        if partition.len() == before {
            debug!(id, category = %category, "delete of absent product ignored");
            return;
        }
        self.write_partition(category, &partition);
        self.sync_combined();
        self.events.push(CatalogEvent::Deleted {
            id: id.to_string(),
            category,
        });
    }

    /// Per-category and total product counts, recomputed from `list`.
    pub fn stats(&self) -> CatalogStats {
        let per_category: Vec<(Category, usize)> = Category::ALL
            .iter()
            .map(|c| (*c, self.list(*c).len()))
            .collect();
        let total = per_category.iter().map(|(_, n)| n).sum();
        CatalogStats {
            per_category,
            total,
        }
    }

    /// Filtered, sorted view over the combined catalog.
    pub fn search(&self, filter: &ProductFilter, sort: SortBy) -> Vec<Product> {
        let mut products = self.combined();
        if let Some(material) = filter.material.as_deref() {
            products.retain(|p| match &p.attrs {
                CategoryAttrs::Fashion(a) => {
                    a.material.as_deref().is_some_and(|m| m.contains(material))
                }
                _ => false,
            });
        }
        if let Some(band) = filter.price {
            products.retain(|p| band.contains(p.price));
        }
        match sort {
            SortBy::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
            SortBy::PriceLowHigh => products.sort_by(|a, b| a.price.cmp(&b.price)),
            SortBy::PriceHighLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
            SortBy::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        products
    }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> {
        std::mem::take(&mut self.events)
    }

    fn write_partition(&self, category: Category, products: &[Product]) {
        if !storage::set_json(self.storage.as_ref(), &category.storage_key(), &products) {
            warn!(category = %category, "partition write dropped");
        }
    }

    /// Rebuild the combined view as the union of all partitions. Rebuilding
    /// (rather than mirroring single entries) keeps unsaved seed rows in
    /// the union and can never leave a stale entry behind.
    fn sync_combined(&self) {
        let combined: Vec<Product> = Category::ALL.iter().flat_map(|c| self.list(*c)).collect();
        if !storage::set_json(self.storage.as_ref(), keys::COMBINED_PRODUCTS, &combined) {
            warn!("combined view write dropped");
        }
    }
}

/// First-run demo catalog. Only the fashion partition ships seeds.
fn seed_products(category: Category) -> Vec<Product> {
    if category != Category::Fashion {
        return Vec::new();
    }
    let seed = |id: &str, name: &str, price: i64, stock: u32, material: &str, style: &str| Product {
        id: id.to_string(),
        category: Category::Fashion,
        name: name.to_string(),
        price: Decimal::from(price),
        original_price: None,
        description: None,
        image: Some(format!("../assets/images/tshirt{id}.jpg")),
        stock,
        status: ProductStatus::Active,
        attrs: CategoryAttrs::Fashion(FashionAttrs {
            sizes: Some("S,M,L,XL,XXL".to_string()),
            colors: Some("White,Black,Navy Blue,Gray".to_string()),
            material: Some(material.to_string()),
            style: Some(style.to_string()),
        }),
        created_at: seed_timestamp(),
    };
    vec![
        seed("1", "Classic Cotton T-Shirt", 299, 50, "100% Cotton", "Basic T-Shirt"),
        seed("2", "Printed Graphic T-Shirt", 399, 30, "Cotton Blend", "Printed T-Shirt"),
        seed("3", "Premium Polo T-Shirt", 599, 25, "Pique Cotton", "Polo T-Shirt"),
    ]
}

/// Seeds predate every user-created product, so they sort last under
/// newest-first.
fn seed_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}
