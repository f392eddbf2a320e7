//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use clueless_fitness_core::Product;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// List the catalog.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().all().to_vec())
}

/// Show one product.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    state
        .catalog()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
