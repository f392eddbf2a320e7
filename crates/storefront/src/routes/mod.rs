//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Products
//! GET  /api/products                - Catalog (JSON)
//! GET  /api/products/{id}           - One product (JSON)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                        - Cart panel fragment
//! GET  /cart/summary                - Cart contents (JSON)
//! POST /cart/add                    - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update                 - Update quantity (returns panel)
//! POST /cart/remove                 - Remove line (returns panel)
//! POST /cart/clear                  - Empty cart (returns panel)
//! POST /cart/open|close|toggle      - Panel visibility (returns panel)
//!
//! # Checkout
//! POST /checkout                    - Submit cart, returns URL to open
//!
//! # Orders API
//! POST /api/orders                  - Create provider order
//! GET  /api/orders?orderReference=  - Order status
//! POST /api/gelato/create-order     - Same handler as POST /api/orders
//! GET  /api/gelato/create-order     - 405
//! GET  /api/gelato/test             - Provider connectivity check
//! ```

pub mod cart;
pub mod gelato;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/summary", get(cart::summary))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
        .route("/toggle", post(cart::toggle))
}

/// Create the order API router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::status).post(orders::create))
}

/// Create the provider API router.
pub fn gelato_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-order",
            get(gelato::create_order_method_not_allowed).post(orders::create),
        )
        .route("/test", get(gelato::test))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/api/orders", order_routes())
        .nest("/api/gelato", gelato_routes())
}
