//! Encoding of the persisted cart slot.
//!
//! Current layout:
//!
//! ```json
//! {"version": 1, "items": [{"product": {...}, "selectedVariant": {...}, "quantity": 2}]}
//! ```
//!
//! Slots written before the envelope existed hold a bare array of lines and
//! are read as version 0.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{StorageError, StorageResult};
use crate::line::CartLine;

/// Layout version written by this build.
pub const LAYOUT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    items: &'a [CartLine],
}

/// Serialize the full cart.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a line cannot be encoded.
pub fn encode(lines: &[CartLine]) -> StorageResult<Vec<u8>> {
    let envelope = Envelope {
        version: LAYOUT_VERSION,
        items: lines,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserialize a slot written by this or an earlier build.
///
/// The result always satisfies the live cart's line invariants, whoever
/// wrote the slot. See [`normalize`].
///
/// # Errors
///
/// Returns an error if the bytes are not JSON, do not match either layout,
/// or carry a version newer than [`LAYOUT_VERSION`].
pub fn decode(bytes: &[u8]) -> StorageResult<Vec<CartLine>> {
    let value: Value = serde_json::from_slice(bytes)?;

    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            if version != LAYOUT_VERSION {
                return Err(StorageError::UnsupportedVersion(version));
            }
            map.remove("items").unwrap_or(Value::Array(Vec::new()))
        }
        _ => {
            return Err(StorageError::Unavailable(
                "slot does not hold a cart".to_string(),
            ));
        }
    };

    let lines: Vec<CartLine> = serde_json::from_value(items)?;
    Ok(normalize(lines))
}

/// Bring decoded lines back within the cart's invariants.
///
/// - Lines for the same product and variant merge into the first one, in
///   insertion order
/// - Quantities above the line's stock are clamped to the stock
/// - Lines left with a zero quantity are dropped
#[must_use]
pub fn normalize(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    let mut duplicates = 0usize;
    for line in lines {
        if let Some(first) = merged.iter_mut().find(|l| l.matches(line.key())) {
            first.quantity = first.quantity.saturating_add(line.quantity);
            duplicates += 1;
        } else {
            merged.push(line);
        }
    }
    if duplicates > 0 {
        warn!(duplicates, "Merged duplicate cart lines from slot");
    }

    for line in &mut merged {
        if line.quantity > line.stock() {
            warn!(
                key = %line.key(),
                quantity = line.quantity,
                stock = line.stock(),
                "Clamped cart line to stock"
            );
            line.quantity = line.stock();
        }
    }

    let before = merged.len();
    merged.retain(|line| line.quantity > 0);
    if merged.len() != before {
        warn!(dropped = before - merged.len(), "Dropped empty cart lines from slot");
    }
    merged
}
