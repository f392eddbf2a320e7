//! Wire types for the Gelato REST API.

use clueless_fitness_core::{
    CustomerInfo, OrderConfirmation, OrderFile, OrderRequest, OrderStatus, ShippingAddress,
};
use serde::{Deserialize, Serialize};

/// Checkout page the provider serves for an order that didn't return one.
pub const DEFAULT_PROVIDER_CHECKOUT_BASE: &str = "https://checkout.gelato.com/orders";

/// Body of `POST /orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody<'a> {
    pub order_reference_id: &'a str,
    pub order_items: Vec<CreateOrderItem<'a>>,
    pub shipping_address: &'a ShippingAddress,
    /// Billing is always the shipping address.
    pub billing_address: &'a ShippingAddress,
    pub customer_info: &'a CustomerInfo,
    pub order_type: &'static str,
    pub currency: &'static str,
    pub shipment_method: &'static str,
}

/// One item of [`CreateOrderBody`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem<'a> {
    pub product_id: &'a str,
    pub product_variant: &'a str,
    pub quantity: u32,
    pub files: &'a [OrderFile],
}

impl<'a> From<&'a OrderRequest> for CreateOrderBody<'a> {
    fn from(order: &'a OrderRequest) -> Self {
        Self {
            order_reference_id: &order.order_reference_id,
            order_items: order
                .order_items
                .iter()
                .map(|item| CreateOrderItem {
                    product_id: &item.product_id,
                    product_variant: &item.product_code,
                    quantity: item.quantity,
                    files: &item.files,
                })
                .collect(),
            shipping_address: &order.shipping_address,
            billing_address: &order.shipping_address,
            customer_info: &order.customer_info,
            order_type: "order",
            currency: "GBP",
            shipment_method: "standard",
        }
    }
}

/// Response of `POST /orders`; only the fields we surface.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub id: String,
    #[serde(default)]
    pub order_reference_id: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub total_price: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl From<CreateOrderResponse> for OrderConfirmation {
    fn from(response: CreateOrderResponse) -> Self {
        let checkout_url = response
            .checkout_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{DEFAULT_PROVIDER_CHECKOUT_BASE}/{}", response.id));

        Self {
            id: response.id,
            order_reference: response.order_reference_id,
            status: response.status.unwrap_or_default(),
            checkout_url,
            total_price: response.total_price,
            currency: response.currency,
        }
    }
}

/// Error body shape; the provider uses either field.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A file to upload with `POST /files`.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/png`. Omitted from the part when `None`.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clueless_fitness_core::{FileType, OrderItem};

    use super::*;

    fn order() -> OrderRequest {
        OrderRequest {
            order_reference_id: "CF-1-ABCDEF".to_string(),
            order_items: vec![OrderItem {
                product_id: "tshirt-basic".to_string(),
                product_code: "no-days-off-M-black".to_string(),
                quantity: 2,
                files: vec![OrderFile {
                    url: "https://cluelessfitness.test/teefront2.jpeg".to_string(),
                    file_type: FileType::Front,
                }],
            }],
            shipping_address: ShippingAddress {
                first_name: "Sam".to_string(),
                country: "GB".to_string(),
                ..ShippingAddress::default()
            },
            customer_info: CustomerInfo {
                email: "sam@cluelessfitness.test".to_string(),
                phone: None,
            },
        }
    }

    #[test]
    fn test_create_order_body_mirrors_shipping_into_billing() {
        let order = order();
        let body = serde_json::to_value(CreateOrderBody::from(&order)).unwrap();

        assert_eq!(body["billingAddress"], body["shippingAddress"]);
        assert_eq!(body["orderItems"][0]["productVariant"], "no-days-off-M-black");
        assert_eq!(body["orderType"], "order");
        assert_eq!(body["currency"], "GBP");
        assert_eq!(body["shipmentMethod"], "standard");
    }

    #[test]
    fn test_confirmation_synthesizes_checkout_url() {
        let response: CreateOrderResponse =
            serde_json::from_str(r#"{"id":"g-42","status":"pending"}"#).unwrap();
        let confirmation = OrderConfirmation::from(response);

        assert_eq!(
            confirmation.checkout_url,
            "https://checkout.gelato.com/orders/g-42"
        );
        assert_eq!(confirmation.status, OrderStatus::Pending);
    }

    #[test]
    fn test_confirmation_keeps_provider_checkout_url() {
        let response: CreateOrderResponse = serde_json::from_str(
            r#"{"id":"g-42","checkoutUrl":"https://pay.example/42","totalPrice":49.98,"currency":"GBP"}"#,
        )
        .unwrap();
        let confirmation = OrderConfirmation::from(response);

        assert_eq!(confirmation.checkout_url, "https://pay.example/42");
        assert_eq!(confirmation.currency.as_deref(), Some("GBP"));
        assert!(confirmation.total_price.is_some());
    }
}
