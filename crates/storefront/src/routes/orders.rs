//! Order API handlers.
//!
//! `POST /api/orders` is the canonical order-creation endpoint;
//! `POST /api/gelato/create-order` routes to the same handler.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use clueless_fitness_core::{CustomerInfo, OrderItem, OrderRequest, OrderStatus, ShippingAddress};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Order-creation body. Fields are optional so missing ones produce a
/// precise 400 instead of a generic decode failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub order_reference_id: Option<String>,
    pub order_items: Option<Vec<OrderItem>>,
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
}

impl TryFrom<CreateOrderPayload> for OrderRequest {
    type Error = AppError;

    fn try_from(payload: CreateOrderPayload) -> Result<Self> {
        let order_items = payload
            .order_items
            .filter(|items| !items.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing required field: orderItems".to_string()))?;
        let order_reference_id = payload
            .order_reference_id
            .filter(|reference| !reference.trim().is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("Missing required field: orderReferenceId".to_string())
            })?;
        let shipping_address = payload.shipping_address.ok_or_else(|| {
            AppError::BadRequest("Missing required field: shippingAddress".to_string())
        })?;

        Ok(Self {
            order_reference_id,
            order_items,
            shipping_address,
            customer_info: payload.customer_info,
        })
    }
}

/// Successful order-creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub order_reference: String,
    pub checkout_url: String,
    pub status: OrderStatus,
    pub total_price: Option<serde_json::Value>,
    pub currency: Option<String>,
}

/// Create an order with the provider.
///
/// POST /api/orders
///
/// # Errors
///
/// 400 when a required field is missing, 500 with details when the provider
/// call fails.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateOrderPayload>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let order = OrderRequest::try_from(payload)?;

    tracing::info!(
        order_ref = %order.order_reference_id,
        items = order.order_items.len(),
        quantity = order.total_quantity(),
        "Creating order"
    );

    let confirmation = state
        .gelato()
        .create_order(&order)
        .await
        .map_err(AppError::OrderFailed)?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: confirmation.id,
        order_reference: confirmation
            .order_reference
            .unwrap_or(order.order_reference_id),
        checkout_url: confirmation.checkout_url,
        status: confirmation.status,
        total_price: confirmation.total_price,
        currency: confirmation.currency,
    }))
}

/// Query for [`status`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub order_reference: Option<String>,
}

/// Order status payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_reference: String,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

/// Look up an order's status.
///
/// GET /api/orders?orderReference=...
///
/// Orders are not stored locally, so every known-format lookup reports
/// `processing` with no tracking details.
#[instrument(skip(query))]
pub async fn status(Query(query): Query<StatusQuery>) -> Result<Json<OrderStatusResponse>> {
    let order_reference = query
        .order_reference
        .filter(|reference| !reference.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing orderReference parameter".to_string()))?;

    Ok(Json(OrderStatusResponse {
        order_reference,
        status: OrderStatus::Processing,
        tracking_number: None,
        estimated_delivery: None,
    }))
}
