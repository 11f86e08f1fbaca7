//! Cart session: a persisted, single-writer accumulator of line items.
//!
//! Loaded from storage when the page opens, persisted after every
//! mutation. An absent or unreadable cart key just means an empty cart.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::cart::{AddPolicy, CartLine, CartSummary, ProductSnapshot};
use crate::domain::events::CartEvent;
use crate::storage::{self, StoragePort};

pub struct CartSession {
    storage: Arc<dyn StoragePort>,
    key: String,
    lines: Vec<CartLine>,
    events: Vec<CartEvent>,
}

impl CartSession {
    /// Open the cart persisted under `key`, or an empty one.
    pub fn open(storage: Arc<dyn StoragePort>, key: impl Into<String>) -> Self {
        let key = key.into();
        let lines = storage::get_json(storage.as_ref(), &key).unwrap_or_default();
        Self {
            storage,
            key,
            lines,
            events: Vec::new(),
        }
    }

    /// Add one unit of a product under the page's add-to-cart policy and
    /// return the updated aggregate.
    pub fn add(&mut self, snapshot: ProductSnapshot, policy: AddPolicy) -> CartSummary {
        match policy {
            AddPolicy::Merge => {
                if let Some(line) = self
                    .lines
                    .iter_mut()
                    .find(|l| l.snapshot.product_id == snapshot.product_id)
                {
                    line.quantity += 1;
                    let event = CartEvent::ItemAdded {
                        line_id: line.id.clone(),
                        name: line.snapshot.name.clone(),
                    };
                    self.events.push(event);
                } else {
                    self.push_line(snapshot);
                }
            }
            AddPolicy::Append => self.push_line(snapshot),
        }
        self.persist();
        self.summary()
    }

    /// Adjust a line's quantity by `delta`, clamped to a minimum of 1.
    /// Removal is a separate, explicit action.
    pub fn set_quantity(&mut self, line_id: &str, delta: i64) {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) else {
            debug!(line_id, "quantity change on absent line ignored");
            return;
        };
        let next = i64::from(line.quantity) + delta;
        line.quantity = next.clamp(1, i64::from(u32::MAX)) as u32;
        let event = CartEvent::QuantityChanged {
            line_id: line.id.clone(),
            quantity: line.quantity,
        };
        self.events.push(event);
        self.persist();
    }

    /// Delete a line unconditionally. Removing an absent line is a no-op.
    pub fn remove(&mut self, line_id: &str) {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        if self.lines.len() == before {
            return;
        }
        self.events.push(CartEvent::ItemRemoved {
            line_id: line_id.to_string(),
        });
        self.persist();
    }

    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        self.lines.clear();
        self.events.push(CartEvent::Cleared);
        self.persist();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit price × quantity`; unit prices come from the add-time
    /// snapshots, never from the live catalog.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_count: self.line_count(),
            total_quantity: self.total_quantity(),
            total_price: self.total(),
        }
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_line(&mut self, snapshot: ProductSnapshot) {
        let line = CartLine::open(snapshot);
        self.events.push(CartEvent::ItemAdded {
            line_id: line.id.clone(),
            name: line.snapshot.name.clone(),
        });
        self.lines.push(line);
    }

    fn persist(&self) {
        if !storage::set_json(self.storage.as_ref(), &self.key, &self.lines) {
            warn!(key = %self.key, "cart write dropped, in-memory lines kept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, MemoryStorage};

    fn snapshot(id: &str, name: &str, price: &str) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.into(),
            name: name.into(),
            price: price.into(),
            image: None,
        }
    }

    fn session(storage: &Arc<MemoryStorage>) -> CartSession {
        CartSession::open(Arc::clone(storage) as Arc<dyn StoragePort>, keys::STOREFRONT_CART)
    }

    #[test]
    fn test_merge_policy_increments_existing_line() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);

        cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);
        cart.add(snapshot("B", "Beta", "$20"), AddPolicy::Merge);
        let summary = cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);

        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_price, Decimal::from(40));
        let quantities: Vec<(String, u32)> = cart
            .lines()
            .iter()
            .map(|l| (l.snapshot.product_id.clone(), l.quantity))
            .collect();
        assert_eq!(quantities, vec![("A".into(), 2), ("B".into(), 1)]);
    }

    #[test]
    fn test_append_policy_always_adds_a_line() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);

        cart.add(snapshot("A", "Alpha", "₹1,299"), AddPolicy::Append);
        let summary = cart.add(snapshot("A", "Alpha", "₹1,299"), AddPolicy::Append);

        assert_eq!(summary.line_count, 2);
        assert!(cart.lines().iter().all(|l| l.quantity == 1));
        assert_eq!(summary.total_price, Decimal::from(2598));
        // distinct line ids even for the same product
        assert_ne!(cart.lines()[0].id, cart.lines()[1].id);
    }

    #[test]
    fn test_set_quantity_clamps_at_one() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);
        cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);
        let line_id = cart.lines()[0].id.clone();

        cart.set_quantity(&line_id, -1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.line_count(), 1);

        cart.set_quantity(&line_id, 4);
        assert_eq!(cart.lines()[0].quantity, 5);
        cart.set_quantity(&line_id, -3);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_set_quantity_on_absent_line_is_a_noop() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);
        cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);
        cart.take_events();

        cart.set_quantity("nope", 3);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_remove_is_unconditional_and_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);
        cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);
        let line_id = cart.lines()[0].id.clone();
        cart.set_quantity(&line_id, 7);

        cart.remove(&line_id);
        assert!(cart.is_empty());
        cart.remove(&line_id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);
        cart.add(snapshot("A", "Alpha", "₹500"), AddPolicy::Merge);
        cart.add(snapshot("A", "Alpha", "₹500"), AddPolicy::Merge);
        drop(cart);

        let reloaded = session(&storage);
        assert_eq!(reloaded.line_count(), 1);
        assert_eq!(reloaded.total_quantity(), 2);
        assert_eq!(reloaded.total(), Decimal::from(1000));
    }

    #[test]
    fn test_unreadable_cart_key_opens_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::STOREFRONT_CART, "!!").unwrap();
        let cart = session(&storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = session(&storage);
        cart.add(snapshot("A", "Alpha", "$10"), AddPolicy::Append);
        cart.clear();
        assert!(cart.is_empty());
        drop(cart);
        assert!(session(&storage).is_empty());
    }

    #[test]
    fn test_carts_are_keyed_per_storefront() {
        let storage = Arc::new(MemoryStorage::new());
        let mut fashion = CartSession::open(
            Arc::clone(&storage) as Arc<dyn StoragePort>,
            "fashionCart",
        );
        fashion.add(snapshot("A", "Alpha", "$10"), AddPolicy::Merge);

        let deals = session(&storage);
        assert!(deals.is_empty());
    }
}
