//! Derived cart values.
//!
//! Nothing here is stored. [`CartTotals::compute`] runs on every read.

use glossy_core::Price;

use crate::line::CartLine;

/// Flat-rate shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_threshold: Price,
    /// Fee charged otherwise, including on an empty cart.
    pub flat_fee: Price,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Price::from_cents(5000),
            flat_fee: Price::from_cents(500),
        }
    }
}

impl ShippingPolicy {
    #[must_use]
    pub fn fee_for(&self, subtotal: Price) -> Price {
        if subtotal > self.free_threshold {
            Price::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// Snapshot of the derived values of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
}

impl CartTotals {
    #[must_use]
    pub fn compute(lines: &[CartLine], policy: &ShippingPolicy) -> Self {
        let item_count = lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity));
        let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
        let shipping_fee = policy.fee_for(subtotal);

        Self {
            item_count,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }

    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}
