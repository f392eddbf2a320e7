//! Clueless Fitness Core - Shared domain types.
//!
//! This crate provides the types used across the Clueless Fitness components:
//! - `storefront` - Public-facing shop, cart and checkout
//! - `cli` - Command-line diagnostics for the fulfillment provider
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no
//! database access, no HTTP clients. This keeps it lightweight and lets the
//! cart logic be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, products, orders and statuses
//! - [`cart`] - The per-session cart store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartLine};
pub use types::*;
