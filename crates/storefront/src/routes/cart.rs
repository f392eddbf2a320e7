//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself is a [`Cart`] value serialized into the visitor's session;
//! every handler loads it, applies one operation and saves it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use clueless_fitness_core::{Cart, CartLine, CartLineId, CheckoutPath};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{CheckoutDetails, CheckoutOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Session key holding the serialized cart.
pub const CART_SESSION_KEY: &str = "cart";

/// HTMX event fired whenever the cart changes.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub size: String,
    pub color: String,
    pub color_hex: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
    pub is_open: bool,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.product.name.clone(),
            size: line.size.name.clone(),
            color: line.color.name.clone(),
            color_hex: line.color.hex.clone(),
            quantity: line.quantity,
            price: line.unit_price().display(),
            line_price: line.line_total().display(),
            image: line.product.primary_image().map(String::from),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().display(),
            item_count: cart.total_items(),
            is_open: cart.is_open(),
        }
    }
}

/// Cart as returned by `GET /cart/summary`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary<'a> {
    pub lines: &'a [CartLine],
    pub total_items: u32,
    pub total_price: String,
    pub currency: &'static str,
    pub is_open: bool,
}

/// Body of `POST /checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_reference: String,
    pub checkout_url: String,
    pub path: CheckoutPath,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart; a fresh session gets an empty, closed cart.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(CART_SESSION_KEY)
        .await?
        .unwrap_or_default())
}

async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(CART_SESSION_KEY, cart).await?;
    Ok(())
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Size id or code.
    pub size: String,
    /// Color id.
    pub color: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Slide-out cart panel fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn panel(cart: &Cart) -> CartPanelTemplate {
    CartPanelTemplate {
        cart: CartView::from(cart),
    }
}

/// Display the cart panel.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartPanelTemplate> {
    let cart = load_cart(&session).await?;
    Ok(panel(&cart))
}

/// Cart contents as JSON.
#[instrument(skip(session))]
pub async fn summary(session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let total = cart.total_price();

    Ok(Json(CartSummary {
        lines: cart.lines(),
        total_items: cart.total_items(),
        total_price: total.amount.to_string(),
        currency: total.currency_code.code(),
        is_open: cart.is_open(),
    })
    .into_response())
}

/// Add item to cart (HTMX).
///
/// Returns the count badge with an HTMX trigger so the panel refreshes.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .get(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    let size = product
        .size(&form.size)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown size: {}", form.size)))?;
    let color = product
        .color(&form.color)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown color: {}", form.color)))?;

    let mut cart = load_cart(&session).await?;
    let line_id = cart.add_item(product, size, color, form.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    tracing::debug!(line_id = %line_id, total_items = cart.total_items(), "Added to cart");

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    )
        .into_response())
}

/// Update cart line quantity (HTMX); zero or less removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&CartLineId::new(form.line_id), form.quantity);
    save_cart(&session, &cart).await?;

    Ok((AppendHeaders([CART_UPDATED]), panel(&cart)).into_response())
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(&CartLineId::new(form.line_id));
    save_cart(&session, &cart).await?;

    Ok((AppendHeaders([CART_UPDATED]), panel(&cart)).into_response())
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok((AppendHeaders([CART_UPDATED]), panel(&cart)).into_response())
}

/// Apply a visibility change and re-render the panel.
async fn set_visibility(session: &Session, change: fn(&mut Cart)) -> Result<CartPanelTemplate> {
    let mut cart = load_cart(session).await?;
    change(&mut cart);
    save_cart(session, &cart).await?;
    Ok(panel(&cart))
}

#[instrument(skip(session))]
pub async fn open(session: Session) -> Result<CartPanelTemplate> {
    set_visibility(&session, Cart::open).await
}

#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<CartPanelTemplate> {
    set_visibility(&session, Cart::close).await
}

#[instrument(skip(session))]
pub async fn toggle(session: Session) -> Result<CartPanelTemplate> {
    set_visibility(&session, Cart::toggle).await
}

/// Check out the session cart.
///
/// Accepts an optional JSON body with `shippingAddress` and `customerInfo`.
/// Responds `204 No Content` for an empty cart, otherwise with the URL the
/// client should open and an `HX-Redirect` header for HTMX callers.
#[instrument(skip(state, session, body))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Response> {
    let details: CheckoutDetails = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutDetails::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid checkout details: {e}")))?
    };

    let mut cart = load_cart(&session).await?;
    let outcome = state.checkout().run(&mut cart, details).await?;

    let CheckoutOutcome::Redirect(redirect) = outcome else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    save_cart(&session, &cart).await?;

    let checkout_url = redirect.checkout_url.to_string();
    Ok((
        AppendHeaders([
            CART_UPDATED,
            ("HX-Redirect", checkout_url.as_str()),
        ]),
        Json(CheckoutResponse {
            order_reference: redirect.order_reference.to_string(),
            checkout_url: checkout_url.clone(),
            path: redirect.path,
        }),
    )
        .into_response())
}
