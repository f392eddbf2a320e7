//! Core types for Clueless Fitness.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use order::{
    CustomerInfo, FileType, OrderConfirmation, OrderFile, OrderItem, OrderReference,
    OrderReferenceError, OrderRequest, ShippingAddress,
};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductColor, ProductSize};
pub use status::*;
