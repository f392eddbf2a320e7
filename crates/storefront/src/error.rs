//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error renders as a JSON body with at least an `error` field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::gelato::GelatoError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Provider call failed outside the order endpoint.
    #[error("Gelato error: {0}")]
    Gelato(#[from] GelatoError),

    /// Provider rejected or failed an explicit order creation.
    #[error("Order creation failed: {0}")]
    OrderFailed(GelatoError),

    /// Checkout could not build the order.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Gelato(GelatoError::MissingApiKey)
            | Self::OrderFailed(_)
            | Self::Checkout(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gelato(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Only provider failures carry details; they hold no secrets
        let body = match &self {
            Self::OrderFailed(e) => json!({
                "success": false,
                "error": "Failed to create order",
                "details": e.to_string(),
            }),
            Self::Gelato(e) => json!({
                "error": "External service error",
                "details": e.to_string(),
            }),
            Self::Checkout(e) => json!({
                "error": "Checkout failed",
                "details": e.to_string(),
            }),
            Self::Session(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::NotFound(what) => json!({ "error": format!("Not found: {what}") }),
            Self::BadRequest(message) => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
