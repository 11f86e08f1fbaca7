//! Local-first storefront catalog and cart engine.
//!
//! Backs a set of static storefront pages and their admin panel: product
//! records partitioned by category with a combined cross-category view,
//! policy-driven cart sessions, a static currency projection, and a
//! cosmetic admin gate, all over a synchronous key/value storage port.
//!
//! ## Features
//! - Product catalog CRUD, partitioned by category, kept in sync with a
//!   combined view used for cross-category browse and search
//! - Cart sessions supporting both merge and append add-to-cart policies
//! - Static multi-currency price projection and formatting
//! - Admin session gate (single authorized credential pair)
//! - Transient notifications with deterministic auto-dismiss timers

use thiserror::Error;

pub mod cart;
pub mod catalog;
pub mod domain;
pub mod notify;
pub mod session;
pub mod storage;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Email not authorized for admin access")]
    UnauthorizedEmail,

    #[error("Invalid password")]
    InvalidPassword,
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub use cart::CartSession;
pub use catalog::{CatalogStats, CatalogStore, PriceBand, ProductFilter, SortBy};
pub use domain::cart::{AddPolicy, CartLine, CartSummary, ProductSnapshot};
pub use domain::currency::Currency;
pub use domain::events::{CartEvent, CatalogEvent};
pub use domain::product::{
    Category, CategoryAttrs, FashionAttrs, LaptopAttrs, PhoneAttrs, Product, ProductDraft,
    ProductStatus,
};
pub use notify::{Debouncer, Level, Notification, NotificationCenter, Throttle};
pub use session::{AdminConfig, AdminGate, AdminSession, LoginRequest};
pub use storage::{FileStorage, MemoryStorage, StoragePort};
