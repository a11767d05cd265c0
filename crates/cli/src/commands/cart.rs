//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! glossy show
//!
//! # Add two units of variant 10 of product 1 (looked up in the catalog API)
//! glossy add --product 1 --variant 10 --quantity 2
//!
//! # Add from a product JSON file instead of the API
//! glossy add --product-file labial.json --variant 10
//!
//! # Change a line's quantity
//! glossy update --product 1 --variant 10 --delta -1
//!
//! # Remove a line, or everything
//! glossy remove --product 1 --variant 10
//! glossy clear
//!
//! # Follow changes made by other processes
//! glossy watch
//! ```

use std::num::NonZeroU32;
use std::path::PathBuf;

use glossy_cart::{CartError, LineKey};
use glossy_core::{Product, ProductId, VariantId};
use tracing::{info, instrument, warn};

use super::{CommandError, log_cart, open_cart};
use crate::catalog::CatalogClient;
use crate::config::CliConfig;

/// Where `add` gets the product from.
#[derive(Debug, Clone)]
pub enum ProductSource {
    Catalog(ProductId),
    File(PathBuf),
}

/// Log the cart contents and totals.
pub fn show(config: &CliConfig) {
    let (_storage, store) = open_cart(config);
    log_cart(store.config(), &store.items(), &store.totals());
}

/// Add units of a product variant to the cart.
///
/// # Errors
///
/// Returns `CommandError::StockExceeded` when the variant does not have
/// enough stock, or an error if the product cannot be loaded.
#[instrument(skip(config, catalog))]
pub async fn add(
    config: &CliConfig,
    catalog: &CatalogClient,
    source: ProductSource,
    variant_id: VariantId,
    quantity: NonZeroU32,
) -> Result<u32, CommandError> {
    let product = match source {
        ProductSource::Catalog(id) => catalog.product(id).await?,
        ProductSource::File(path) => read_product(&path)?,
    };
    let variant = product
        .variant(variant_id)
        .ok_or(CommandError::UnknownVariant(product.id, variant_id))?;

    let (_storage, store) = open_cart(config);
    let new_quantity = store
        .add_item(&product, variant, quantity)
        .map_err(|e| match e {
            CartError::StockExceeded { max } => CommandError::StockExceeded {
                product: product.name.clone(),
                variant: variant.tone_name.clone(),
                max,
            },
        })?;

    info!(
        "Added {} x {} ({}), now {} in cart",
        quantity,
        product.name,
        variant.tone_name,
        new_quantity
    );
    log_cart(store.config(), &store.items(), &store.totals());
    Ok(new_quantity)
}

/// Change a line's quantity by `delta`.
///
/// An unknown line, or an out-of-range result, leaves the cart as it was.
#[instrument(skip(config))]
pub fn update(config: &CliConfig, key: LineKey, delta: i64) -> bool {
    let (_storage, store) = open_cart(config);
    let current = store.get_item_quantity(key.product_id, key.variant_id);
    if current == 0 {
        warn!("Cart has no line {}", key);
        return false;
    }

    let applied = store.update_quantity(key, delta);
    if applied {
        info!(
            "Quantity of {} is now {}",
            key,
            store.get_item_quantity(key.product_id, key.variant_id)
        );
    } else {
        warn!(
            "Quantity of {} stays at {}: the result must be between 1 and the available stock",
            key, current
        );
    }
    log_cart(store.config(), &store.items(), &store.totals());
    applied
}

/// Remove a line from the cart.
#[instrument(skip(config))]
pub fn remove(config: &CliConfig, key: LineKey) -> bool {
    let (_storage, store) = open_cart(config);
    let removed = store.remove_item(key);
    if removed {
        info!("Removed {} from the cart", key);
    } else {
        warn!("Cart has no line {}", key);
    }
    log_cart(store.config(), &store.items(), &store.totals());
    removed
}

/// Empty the cart.
pub fn clear(config: &CliConfig) {
    let (_storage, store) = open_cart(config);
    store.clear();
    info!("Cart emptied");
}

/// Follow the cart until Ctrl-C, logging it after every change made by
/// another process.
pub async fn watch(config: &CliConfig) {
    let (storage, store) = open_cart(config);
    let poller = storage.watch(config.sync_interval);
    let sync = store.spawn_sync();
    let mut revisions = store.subscribe();

    info!(
        path = %storage.path_for(&config.cart.storage_key).display(),
        "Watching cart, press Ctrl-C to stop"
    );
    log_cart(store.config(), &store.items(), &store.totals());

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                info!("Cart changed");
                log_cart(store.config(), &store.items(), &store.totals());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
        }
    }

    poller.abort();
    sync.abort();
}

fn read_product(path: &std::path::Path) -> Result<Product, CommandError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
