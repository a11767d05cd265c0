//! Glossy Core - Shared catalog types.
//!
//! This crate provides the types shared by the cart library and the CLI:
//! - typed entity IDs for products, variants, images and categories
//! - an exact decimal [`Price`]
//! - the catalog [`Category`] / [`Product`] / [`ProductVariant`] / [`ProductImage`] model as
//!   served by the catalog API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices, plus the catalog model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
