//! Cart lines.

use std::fmt;

use glossy_core::{Price, Product, ProductId, ProductVariant, VariantId};
use serde::{Deserialize, Serialize};

/// Identifies a cart line by its product and variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant_id: VariantId,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, variant_id: VariantId) -> Self {
        Self {
            product_id,
            variant_id,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.variant_id)
    }
}

/// One row in the cart.
///
/// `product` and `selected_variant` are snapshots taken when the line was
/// first added. `quantity` stays within `1..=selected_variant.stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub selected_variant: ProductVariant,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product.id, self.selected_variant.id)
    }

    #[must_use]
    pub fn matches(&self, key: LineKey) -> bool {
        self.key() == key
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.selected_variant.price * self.quantity
    }

    /// Stock of the variant as captured on this line.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.selected_variant.stock
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use glossy_core::{CategoryId, Price, Product, ProductId, ProductVariant, VariantId};

    pub fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            full_description: None,
            base_price: Price::ZERO,
            images: Vec::new(),
            active: true,
            label: String::new(),
            category_id: CategoryId::new(1),
            variants: Vec::new(),
        }
    }

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
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{product, variant};
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product: product(1, "Labial"),
            selected_variant: variant(10, "Rojo", 1250, 10),
            quantity: 3,
        };
        assert_eq!(line.line_total(), Price::from_cents(3750));
        assert_eq!(line.stock(), 10);
    }

    #[test]
    fn test_key_matches_product_and_variant() {
        let line = CartLine {
            product: product(1, "Labial"),
            selected_variant: variant(10, "Rojo", 1250, 10),
            quantity: 1,
        };
        assert!(line.matches(LineKey::new(ProductId::new(1), VariantId::new(10))));
        assert!(!line.matches(LineKey::new(ProductId::new(1), VariantId::new(11))));
        assert!(!line.matches(LineKey::new(ProductId::new(2), VariantId::new(10))));
        assert_eq!(line.key().to_string(), "1/10");
    }

    #[test]
    fn test_serialized_field_names() {
        let line = CartLine {
            product: product(1, "Labial"),
            selected_variant: variant(10, "Rojo", 1250, 10),
            quantity: 2,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("selectedVariant").is_some());
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["selectedVariant"]["toneName"], "Rojo");
    }
}
