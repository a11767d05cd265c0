//! Catalog model as served by the catalog API.
//!
//! Field names follow the API's camelCase JSON. The cart stores these
//! structs verbatim inside each line, so anything added here must stay
//! backwards compatible with carts persisted by older builds (new fields
//! need `#[serde(default)]`).

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ImageId, ProductId, VariantId};
use super::price::Price;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Cover image URL on the image server.
    #[serde(default)]
    pub image: String,
}

/// A product image hosted on the image server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ImageId,
    /// Path relative to the image server.
    pub url: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub main_image: bool,
    pub product_id: ProductId,
}

/// A purchasable tone/color of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    /// Display label, e.g. "Rojo Pasión".
    pub tone_name: String,
    /// Hex color code of the tone.
    #[serde(default)]
    pub tone_code: String,
    pub price: Price,
    /// Units available for purchase.
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
}

/// A catalog product with its images and variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_description: Option<String>,
    pub base_price: Price,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub label: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// The image flagged as main, falling back to the lowest position.
    #[must_use]
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|img| img.main_image).or_else(|| {
            self.images
                .iter()
                .min_by_key(|img| img.position.unwrap_or(i32::MAX))
        })
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Whether any variant has stock left.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.variants.iter().any(|v| v.stock > 0)
    }
}
