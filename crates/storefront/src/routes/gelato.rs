//! Provider diagnostics endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::gelato::diagnostics::{ConnectionReport, test_connection};
use crate::state::AppState;

/// Connection check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResponse {
    #[serde(flatten)]
    pub report: ConnectionReport,
    pub message: String,
    pub timestamp: String,
}

/// Probe provider connectivity with each auth scheme.
///
/// GET /api/gelato/test
///
/// # Errors
///
/// 500 when no API key is configured.
#[instrument(skip(state))]
pub async fn test(State(state): State<AppState>) -> Result<Json<ConnectionTestResponse>> {
    let report = test_connection(&state.config().gelato).await?;

    let message = match report.method {
        Some(method) => format!("Gelato API connection successful using {method}"),
        None => "All authentication methods failed".to_string(),
    };

    Ok(Json(ConnectionTestResponse {
        report,
        message,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// GET /api/gelato/create-order
pub async fn create_order_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Use POST to create an order" })),
    )
        .into_response()
}
