//! Mutation events.
//!
//! The rendering surface drains these and shows them as transient
//! notifications.

use super::product::Category;

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogEvent {
    Saved {
        id: String,
        category: Category,
        name: String,
    },
    Deleted {
        id: String,
        category: Category,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemAdded { line_id: String, name: String },
    QuantityChanged { line_id: String, quantity: u32 },
    ItemRemoved { line_id: String },
    Cleared,
}
