//! Order model sent to the fulfillment provider.
//!
//! Orders are built transiently at checkout time and never stored. The
//! serialized field names follow the provider's JSON contract (camelCase).

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// Prefix shared by every generated order reference.
pub const ORDER_REFERENCE_PREFIX: &str = "CF";

/// Length of the random base-36 suffix.
pub const ORDER_REFERENCE_SUFFIX_LEN: usize = 6;

/// Errors that can occur when parsing an [`OrderReference`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderReferenceError {
    /// The input does not start with `CF-`.
    #[error("order reference must start with \"{ORDER_REFERENCE_PREFIX}-\"")]
    MissingPrefix,
    /// The timestamp segment is empty or not all digits.
    #[error("order reference timestamp must be decimal digits")]
    InvalidTimestamp,
    /// The suffix is not six uppercase base-36 characters.
    #[error("order reference suffix must be {ORDER_REFERENCE_SUFFIX_LEN} uppercase base-36 characters")]
    InvalidSuffix,
}

/// A client-generated order reference: `CF-<millis>-<SUFFIX>`.
///
/// References are not checked against any store, so two attempts in the same
/// millisecond can collide with probability 36^-6.
///
/// ```
/// use clueless_fitness_core::OrderReference;
///
/// let reference = OrderReference::generate();
/// assert!(reference.as_str().starts_with("CF-"));
/// assert!(OrderReference::parse(reference.as_str()).is_ok());
/// assert!(OrderReference::parse("CF-123-abcdef").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Generate a reference from the current wall-clock time.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self::generate_with(millis, &mut rand::rng())
    }

    /// Generate a reference from an explicit timestamp and random source.
    #[must_use]
    pub fn generate_with<R: Rng>(millis: i64, rng: &mut R) -> Self {
        let suffix: String = (0..ORDER_REFERENCE_SUFFIX_LEN)
            .map(|_| {
                let digit = rng.random_range(0..36_u32);
                char::from_digit(digit, 36)
                    .unwrap_or('0')
                    .to_ascii_uppercase()
            })
            .collect();
        Self(format!("{ORDER_REFERENCE_PREFIX}-{millis}-{suffix}"))
    }

    /// Parse and validate a reference string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not of the form `CF-<digits>-<SUFFIX>`
    /// where `SUFFIX` is six characters from `0-9A-Z`.
    pub fn parse(s: &str) -> Result<Self, OrderReferenceError> {
        let rest = s
            .strip_prefix(ORDER_REFERENCE_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or(OrderReferenceError::MissingPrefix)?;

        let (timestamp, suffix) = rest
            .split_once('-')
            .ok_or(OrderReferenceError::InvalidTimestamp)?;

        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderReferenceError::InvalidTimestamp);
        }

        let suffix_ok = suffix.len() == ORDER_REFERENCE_SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
        if !suffix_ok {
            return Err(OrderReferenceError::InvalidSuffix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which print placement a file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Front,
    Back,
    Mockup,
}

/// A design file attached to an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFile {
    /// Absolute URL the provider downloads the artwork from.
    pub url: String,
    #[serde(rename = "type", default)]
    pub file_type: FileType,
}

/// One line of an order as the provider sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Provider product identifier.
    pub product_id: String,
    /// Variant code, `{productId}-{sizeCode}-{colorId}`.
    pub product_code: String,
    pub quantity: u32,
    #[serde(default)]
    pub files: Vec<OrderFile>,
}

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Everything needed to create an order with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_reference_id: String,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub customer_info: CustomerInfo,
}

impl OrderRequest {
    /// Total number of units across all items, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.order_items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

/// The provider's acknowledgement of a created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Provider-issued order id.
    pub id: String,
    /// Our reference, echoed back by the provider when it returns one.
    pub order_reference: Option<String>,
    pub status: OrderStatus,
    pub checkout_url: String,
    /// Total as reported by the provider; its type is provider-defined.
    pub total_price: Option<serde_json::Value>,
    pub currency: Option<String>,
}
