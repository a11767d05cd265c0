//! Integration tests for the Glossy Beauty cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p glossy-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenario` - End-to-end shopping session through the public API
//! - `multi_context` - Several stores sharing one slot stay convergent
//! - `file_backend` - Separate file backends standing in for separate processes
//! - `persisted_layout` - Slot contents written by older or broken builds
//!
//! This crate only holds shared fixtures; the tests live in `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use glossy_cart::{CartConfig, CartStore, MemoryStorage};
use glossy_core::{CategoryId, Price, Product, ProductId, ProductVariant, VariantId};

/// How long async tests wait for a background sync before failing.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// A product with a single variant.
#[must_use]
pub fn product(id: i64, name: &str, variant: ProductVariant) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} description"),
        full_description: None,
        base_price: variant.price,
        images: Vec::new(),
        active: true,
        label: String::new(),
        category_id: CategoryId::new(1),
        variants: vec![variant],
    }
}

#[must_use]
pub fn variant(id: i64, tone: &str, cents: i64, stock: u32) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(id),
        tone_name: tone.to_string(),
        tone_code: String::new(),
        price: Price::from_cents(cents),
        stock,
        color_hex: None,
    }
}

/// "Labial Mate" in "Rojo Pasión": 12.50, 10 in stock.
#[must_use]
pub fn lipstick() -> (Product, ProductVariant) {
    let v = variant(10, "Rojo Pasión", 1250, 10);
    (product(1, "Labial Mate", v.clone()), v)
}

/// "Paleta Sunset" in "Cálido": 45.00, 2 in stock.
#[must_use]
pub fn palette() -> (Product, ProductVariant) {
    let v = variant(20, "Cálido", 4500, 2);
    (product(2, "Paleta Sunset", v.clone()), v)
}

/// Open a store on `storage` with the default configuration.
#[must_use]
pub fn open(storage: &MemoryStorage) -> CartStore {
    CartStore::open(storage.clone(), CartConfig::default())
}

/// Open a store on `storage` persisting under `key`.
#[must_use]
pub fn open_with_key(storage: &MemoryStorage, key: &str) -> CartStore {
    let config = CartConfig {
        storage_key: key.to_string(),
        ..CartConfig::default()
    };
    CartStore::open(storage.clone(), config)
}
