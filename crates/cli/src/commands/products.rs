//! Catalog browsing command.
//!
//! # Usage
//!
//! ```bash
//! glossy products
//! glossy products --label nuevo
//! glossy products --category 3
//! glossy products --search "labial"
//!
//! # Categories, or one category with its products
//! glossy categories
//! glossy categories --id 3
//! ```

use glossy_cart::CartConfig;
use glossy_core::{CategoryId, Product};
use tracing::info;

use super::CommandError;
use crate::catalog::{CatalogClient, ProductFilter};

/// List catalog products with their variants and stock.
///
/// # Errors
///
/// Returns an error if the catalog API request fails.
pub async fn list(
    catalog: &CatalogClient,
    cart: &CartConfig,
    filter: ProductFilter,
) -> Result<usize, CommandError> {
    let products = catalog.products(filter).await?;
    if products.is_empty() {
        info!("No products found");
    }
    for product in products.iter().filter(|p| p.active) {
        log_product(cart, product);
    }
    Ok(products.len())
}

/// List all categories.
///
/// # Errors
///
/// Returns an error if the catalog API request fails.
pub async fn categories(catalog: &CatalogClient) -> Result<usize, CommandError> {
    let categories = catalog.categories().await?;
    if categories.is_empty() {
        info!("No categories found");
    }
    for category in &categories {
        info!("#{} {}", category.id, category.name);
    }
    Ok(categories.len())
}

/// Show one category and the products filed under it.
///
/// # Errors
///
/// Returns `CatalogError::CategoryNotFound` (wrapped) for an unknown ID, or
/// an error if a request fails.
pub async fn category(
    catalog: &CatalogClient,
    cart: &CartConfig,
    id: CategoryId,
) -> Result<usize, CommandError> {
    let category = catalog.category(id).await?;
    info!("#{} {}", category.id, category.name);
    list(catalog, cart, ProductFilter::Category(id)).await
}

fn log_product(cart: &CartConfig, product: &Product) {
    let stock = if product.in_stock() { "" } else { " [out of stock]" };
    info!(
        "#{} {} from {}{}",
        product.id,
        product.name,
        cart.format_price(product.base_price),
        stock
    );
    for variant in &product.variants {
        info!(
            "    variant {} {} {} ({} in stock)",
            variant.id,
            variant.tone_name,
            cart.format_price(variant.price),
            variant.stock
        );
    }
}
