//! Core types for Glossy Beauty.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod price;

pub use catalog::{Category, Product, ProductImage, ProductVariant};
pub use id::*;
pub use price::{Price, PriceError};
