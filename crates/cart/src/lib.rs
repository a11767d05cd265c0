//! Glossy Cart - the shopper's cart, persisted and kept in sync.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the ordered list of [`CartLine`]s, enforces stock
//!   bounds, and recomputes [`CartTotals`] on every read
//! - Every successful mutation re-serializes the whole cart into a
//!   [`CartStorage`] slot; faults are logged and never surface to callers
//! - Storage backends publish [`StorageEvent`]s; a store reloads when its
//!   slot is rewritten by someone else (another store, another process)
//! - [`Proforma`] projects a cart into a printable pre-invoice
//!
//! # Example
//!
//! ```rust,ignore
//! use glossy_cart::{CartConfig, CartStore, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! let cart = CartStore::open(storage, CartConfig::default());
//!
//! cart.add_item(&product, &variant, NonZeroU32::MIN)?;
//! println!("{}", cart.total());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod line;
pub mod persist;
pub mod proforma;
pub mod storage;
pub mod store;
pub mod totals;

pub use config::{CartConfig, ConfigError};
pub use error::{CartError, StorageError};
pub use line::{CartLine, LineKey};
pub use proforma::{Proforma, ProformaError};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageEvent, WriterId};
pub use store::CartStore;
pub use totals::{CartTotals, ShippingPolicy};
