//! CLI command implementations.

pub mod cart;
pub mod products;
pub mod proforma;

use glossy_cart::{CartConfig, CartLine, CartStore, CartTotals, FileStorage, ProformaError};
use glossy_core::{ProductId, VariantId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::CliConfig;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Only {max} units of {product} ({variant}) are available")]
    StockExceeded {
        product: String,
        variant: String,
        max: u32,
    },

    #[error("Product {0} has no variant {1}")]
    UnknownVariant(ProductId, VariantId),

    #[error("Nothing to export: the cart is empty")]
    EmptyCart,

    #[error("Failed to read product file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid product JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Proforma export failed: {0}")]
    Proforma(#[from] ProformaError),
}

/// Open the file-backed cart described by `config`.
pub fn open_cart(config: &CliConfig) -> (FileStorage, CartStore) {
    let storage = FileStorage::new(&config.cart_dir);
    let store = CartStore::open(storage.clone(), config.cart.clone());
    (storage, store)
}

/// Log every line and the totals block.
pub fn log_cart(config: &CartConfig, lines: &[CartLine], totals: &CartTotals) {
    if lines.is_empty() {
        tracing::info!("Cart is empty");
    }
    for line in lines {
        tracing::info!(
            "{} x {} ({}) [{}] @ {} = {}",
            line.quantity,
            line.product.name,
            line.selected_variant.tone_name,
            line.key(),
            config.format_price(line.selected_variant.price),
            config.format_price(line.line_total()),
        );
    }

    let shipping = if totals.ships_free() {
        "FREE".to_string()
    } else {
        config.format_price(totals.shipping_fee)
    };
    tracing::info!(
        "Items: {}  Subtotal: {}  Shipping: {}  Total: {}",
        totals.item_count,
        config.format_price(totals.subtotal),
        shipping,
        config.format_price(totals.total),
    );
}
