//! A full shopping session through the public cart API.

#![allow(clippy::unwrap_used)]

use std::num::NonZeroU32;

use glossy_cart::{CartError, LineKey, MemoryStorage, Proforma};
use glossy_core::Price;
use glossy_integration_tests::{lipstick, open, palette};

fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

#[test]
fn shopping_session() {
    let storage = MemoryStorage::new();
    let cart = open(&storage);
    let (lipstick, rojo) = lipstick();
    let key = LineKey::new(lipstick.id, rojo.id);

    // Adding the same variant twice merges into one line
    assert_eq!(cart.add_item(&lipstick, &rojo, qty(2)).unwrap(), 2);
    assert_eq!(cart.add_item(&lipstick, &rojo, qty(1)).unwrap(), 3);
    assert_eq!(cart.len(), 1);

    // Three lipsticks at 12.50: below the free-shipping threshold
    assert_eq!(cart.total_item_count(), 3);
    assert_eq!(cart.subtotal(), Price::from_cents(3750));
    assert_eq!(cart.shipping_fee(), Price::from_cents(500));
    assert_eq!(cart.total(), Price::from_cents(4250));

    // 3 + 10 is above stock: nothing changes
    assert!(!cart.update_quantity(key, 10));
    assert_eq!(cart.get_item_quantity(lipstick.id, rojo.id), 3);

    // Removing the only line leaves an empty cart that still pays shipping
    assert!(cart.remove_item(key));
    assert!(cart.is_empty());
    assert_eq!(cart.subtotal(), Price::ZERO);
    assert_eq!(cart.shipping_fee(), Price::from_cents(500));
    assert_eq!(cart.total(), Price::from_cents(500));
}

#[test]
fn crossing_the_threshold_ships_free() {
    let storage = MemoryStorage::new();
    let cart = open(&storage);
    let (lipstick, rojo) = lipstick();
    let (palette, calido) = palette();

    cart.add_item(&palette, &calido, qty(1)).unwrap();
    assert_eq!(cart.subtotal(), Price::from_cents(4500));
    assert_eq!(cart.shipping_fee(), Price::from_cents(500));

    cart.add_item(&lipstick, &rojo, qty(1)).unwrap();
    let totals = cart.totals();
    assert_eq!(totals.subtotal, Price::from_cents(5750));
    assert!(totals.ships_free());
    assert_eq!(totals.total, Price::from_cents(5750));

    let proforma = Proforma::from_cart(&cart);
    assert_eq!(proforma.lines.len(), 2);
    assert_eq!(proforma.lines[0].product_name, "Paleta Sunset");
    assert_eq!(proforma.total, Price::from_cents(5750));
    assert!(proforma.ships_free());
    assert!(proforma.reference.starts_with("PF-"));
    assert_eq!(proforma.reference.len(), 11);

    let html = proforma.render(cart.config()).unwrap();
    assert!(html.contains("FREE"));
    assert!(html.contains("57.50"));
}

#[test]
fn stock_is_enforced_on_every_add() {
    let storage = MemoryStorage::new();
    let cart = open(&storage);
    let (palette, calido) = palette();

    assert_eq!(
        cart.add_item(&palette, &calido, qty(3)),
        Err(CartError::StockExceeded { max: 2 })
    );
    assert!(cart.is_empty());

    cart.add_item(&palette, &calido, qty(2)).unwrap();
    assert_eq!(
        cart.add_item(&palette, &calido, qty(1)),
        Err(CartError::StockExceeded { max: 2 })
    );
    assert_eq!(cart.get_item_quantity(palette.id, calido.id), 2);
}

#[test]
fn clearing_survives_reopen() {
    let storage = MemoryStorage::new();
    let (lipstick, rojo) = lipstick();
    {
        let cart = open(&storage);
        cart.add_item(&lipstick, &rojo, qty(2)).unwrap();
    }

    let cart = open(&storage);
    assert_eq!(cart.get_item_quantity(lipstick.id, rojo.id), 2);
    cart.clear();

    assert!(open(&storage).is_empty());
}
