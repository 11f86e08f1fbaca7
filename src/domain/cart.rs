//! Cart line items and add-to-cart policies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::{self, Currency};
use super::product::Product;

/// How `CartSession::add` treats a product that is already in the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddPolicy {
    /// Increment the existing line's quantity in place.
    Merge,
    /// Always append a fresh line with quantity 1.
    Append,
}

/// Display fields captured at add-time. A snapshot, not a live reference:
/// later catalog edits never change lines already in a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    /// Display price string, e.g. `₹1,299`. Must stay numeric-parseable.
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductSnapshot {
    /// Capture a catalog product as the page displays it. The stored price
    /// is denominated in the page's display currency unit.
    pub fn capture(product: &Product, display_currency: Currency) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: currency::format(product.price, display_currency),
            image: product.image.clone(),
        }
    }

    pub fn unit_price(&self) -> Decimal {
        parse_display_price(&self.price)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    #[serde(flatten)]
    pub snapshot: ProductSnapshot,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub(crate) fn open(snapshot: ProductSnapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            snapshot,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    pub fn unit_price(&self) -> Decimal {
        self.snapshot.unit_price()
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Running aggregate a page renders next to the cart icon.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub line_count: usize,
    pub total_quantity: u32,
    pub total_price: Decimal,
}

/// Parse a unit price out of a display string by stripping everything but
/// digits and the decimal point. Unparseable input counts as zero.
pub fn parse_display_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(Decimal::ZERO)
}
