//! Checkout orchestration.
//!
//! Turns a session cart into a provider order and decides where the visitor
//! goes next:
//!
//! ```text
//! Idle -> Submitting -> Success            -> Idle   (provider checkout URL)
//!                    -> FallbackSubmitting -> Idle   (query-parameter URL)
//! ```
//!
//! The payload and the fallback URL are built before the cart is touched, so
//! a failure there leaves the cart exactly as it was. A failed provider call
//! is never retried; it takes the fallback path once.

use clueless_fitness_core::{
    Cart, CheckoutPath, CustomerInfo, FileType, OrderConfirmation, OrderFile, OrderItem,
    OrderReference, OrderRequest, Price, ShippingAddress,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::CheckoutConfig;
use crate::gelato::{GelatoClient, GelatoError};

/// Something that can create provider orders.
pub trait OrderGateway: Send + Sync {
    /// Create an order with the fulfillment provider.
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, GelatoError>> + Send;
}

impl OrderGateway for GelatoClient {
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, GelatoError>> + Send {
        Self::create_order(self, order)
    }
}

/// Errors that abort a checkout before the cart is modified.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A product in the cart has no image to print.
    #[error("product {0} has no print image")]
    MissingImage(String),

    /// An image path could not be made absolute.
    #[error("invalid image URL {path:?} for product {product}: {source}")]
    ImageUrl {
        product: String,
        path: String,
        #[source]
        source: url::ParseError,
    },
}

/// Shipping and contact details supplied with a checkout request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub customer_info: CustomerInfo,
}

/// Phases of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Submitting,
    Success,
    FallbackSubmitting,
}

/// Where the visitor should be sent after checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub order_reference: OrderReference,
    /// URL to open in a new browsing context.
    pub checkout_url: Url,
    pub path: CheckoutPath,
    /// Cart total at the moment of checkout.
    pub total: Price,
    /// Provider acknowledgement, on the success path.
    pub confirmation: Option<OrderConfirmation>,
}

/// Result of [`Checkout::run`].
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Nothing to check out; no request was made and the cart is untouched.
    EmptyCart,
    /// The cart was submitted (or fell back) and has been cleared and closed.
    Redirect(CheckoutRedirect),
}

/// Checkout orchestrator.
#[derive(Debug, Clone)]
pub struct Checkout<G> {
    gateway: G,
    site_url: Url,
    config: CheckoutConfig,
}

impl<G: OrderGateway> Checkout<G> {
    #[must_use]
    pub const fn new(gateway: G, site_url: Url, config: CheckoutConfig) -> Self {
        Self {
            gateway,
            site_url,
            config,
        }
    }

    /// Check out `cart`.
    ///
    /// On return with a redirect, the cart has been cleared and closed. The
    /// provider call failing is not an error: it yields a fallback redirect.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] when the order payload cannot be built; the
    /// cart is left unmodified in that case.
    #[instrument(skip_all, fields(lines = cart.lines().len(), order_ref = tracing::field::Empty))]
    pub async fn run(
        &self,
        cart: &mut Cart,
        details: CheckoutDetails,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if cart.is_empty() {
            debug!("Checkout requested on empty cart");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let reference = OrderReference::generate();
        let total = cart.total_price();
        tracing::Span::current().record("order_ref", reference.as_str());

        let order = self.build_order(cart, &reference, details)?;
        let fallback_url = self.fallback_url(cart, &reference);

        enter(CheckoutPhase::Submitting, &reference);
        if !self.config.simulated_delay.is_zero() {
            tokio::time::sleep(self.config.simulated_delay).await;
        }

        let redirect = match self.gateway.create_order(&order).await {
            Ok(confirmation) => {
                enter(CheckoutPhase::Success, &reference);
                let checkout_url = match Url::parse(&confirmation.checkout_url) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => url,
                    _ => {
                        warn!(
                            checkout_url = %confirmation.checkout_url,
                            "Provider returned unusable checkout URL, using fallback"
                        );
                        fallback_url
                    }
                };
                CheckoutRedirect {
                    order_reference: reference,
                    checkout_url,
                    path: CheckoutPath::Provider,
                    total,
                    confirmation: Some(confirmation),
                }
            }
            Err(e) => {
                if e.is_configuration() {
                    error!(error = %e, "Provider not configured, using fallback checkout");
                } else {
                    warn!(error = %e, status = ?e.status(), "Order creation failed, using fallback checkout");
                }
                enter(CheckoutPhase::FallbackSubmitting, &reference);
                CheckoutRedirect {
                    order_reference: reference,
                    checkout_url: fallback_url,
                    path: CheckoutPath::Fallback,
                    total,
                    confirmation: None,
                }
            }
        };

        cart.clear();
        cart.close();
        enter(CheckoutPhase::Idle, &redirect.order_reference);

        info!(
            order_ref = %redirect.order_reference,
            path = ?redirect.path,
            total = %redirect.total,
            "Checkout complete"
        );
        Ok(CheckoutOutcome::Redirect(redirect))
    }

    /// Build the provider order for `cart`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if a product has no image or its image path
    /// cannot be resolved against the site URL.
    pub fn build_order(
        &self,
        cart: &Cart,
        reference: &OrderReference,
        details: CheckoutDetails,
    ) -> Result<OrderRequest, CheckoutError> {
        let order_items = cart
            .lines()
            .iter()
            .map(|line| {
                let image = line
                    .product
                    .primary_image()
                    .ok_or_else(|| CheckoutError::MissingImage(line.product.id.to_string()))?;
                let url = absolute_url(&self.site_url, image).map_err(|source| {
                    CheckoutError::ImageUrl {
                        product: line.product.id.to_string(),
                        path: image.to_string(),
                        source,
                    }
                })?;

                Ok(OrderItem {
                    product_id: line.product.provider_product_id().to_string(),
                    product_code: line.variant_code(),
                    quantity: line.quantity,
                    files: vec![OrderFile {
                        url: url.into(),
                        file_type: FileType::Front,
                    }],
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(OrderRequest {
            order_reference_id: reference.to_string(),
            order_items,
            shipping_address: details.shipping_address,
            customer_info: details.customer_info,
        })
    }

    /// Manual checkout URL carrying the order in its query string.
    ///
    /// Per line index `N` (cart order): `product_N`, `size_N`, `color_N`,
    /// `price_N`, `quantity_N`.
    #[must_use]
    pub fn fallback_url(&self, cart: &Cart, reference: &OrderReference) -> Url {
        let mut url = self.config.fallback_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("ref", reference.as_str())
                .append_pair("currency", self.config.currency.code())
                .append_pair("country", &self.config.country);

            for (n, line) in cart.lines().iter().enumerate() {
                query
                    .append_pair(&format!("product_{n}"), &line.product.name)
                    .append_pair(&format!("size_{n}"), &line.size.code)
                    .append_pair(&format!("color_{n}"), &line.color.name)
                    .append_pair(&format!("price_{n}"), &line.product.price.to_string())
                    .append_pair(&format!("quantity_{n}"), &line.quantity.to_string());
            }
        }
        url
    }
}

fn enter(phase: CheckoutPhase, reference: &OrderReference) {
    debug!(order_ref = %reference, ?phase, "Checkout phase");
}

/// Resolve `path` against `base` unless it is already absolute.
fn absolute_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    match Url::parse(path) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(path),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use clueless_fitness_core::{CurrencyCode, OrderStatus};

    use super::*;
    use crate::catalog::Catalog;

    /// Gateway double that records orders and replies with a canned result.
    struct FakeGateway {
        reply: Box<dyn Fn(&OrderRequest) -> Result<OrderConfirmation, GelatoError> + Send + Sync>,
        seen: Mutex<Vec<OrderRequest>>,
    }

    impl FakeGateway {
        fn ok(checkout_url: &'static str) -> Self {
            Self {
                reply: Box::new(move |order| {
                    Ok(OrderConfirmation {
                        id: "g-1".to_string(),
                        order_reference: Some(order.order_reference_id.clone()),
                        status: OrderStatus::Pending,
                        checkout_url: checkout_url.to_string(),
                        total_price: None,
                        currency: Some("GBP".to_string()),
                    })
                }),
                seen: Mutex::default(),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Box::new(|_| {
                    Err(GelatoError::Api {
                        status: 503,
                        message: "maintenance".to_string(),
                    })
                }),
                seen: Mutex::default(),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl OrderGateway for FakeGateway {
        fn create_order(
            &self,
            order: &OrderRequest,
        ) -> impl Future<Output = Result<OrderConfirmation, GelatoError>> + Send {
            self.seen.lock().unwrap().push(order.clone());
            let result = (self.reply)(order);
            async move { result }
        }
    }

    fn checkout(gateway: FakeGateway) -> Checkout<FakeGateway> {
        Checkout::new(
            gateway,
            Url::parse("https://cluelessfitness.test").unwrap(),
            CheckoutConfig {
                fallback_url: Url::parse("https://www.gelato.com/custom/checkout").unwrap(),
                currency: CurrencyCode::GBP,
                country: "GB".to_string(),
                simulated_delay: Duration::ZERO,
            },
        )
    }

    fn cart_with_two_black_mediums() -> Cart {
        let catalog = Catalog::builtin();
        let product = catalog.get("no-days-off").unwrap();
        let mut cart = Cart::new();
        cart.add_item(
            product,
            product.size("M").unwrap(),
            product.color("black").unwrap(),
            2,
        );
        cart.open();
        cart
    }

    fn redirect(outcome: CheckoutOutcome) -> CheckoutRedirect {
        match outcome {
            CheckoutOutcome::Redirect(redirect) => redirect,
            CheckoutOutcome::EmptyCart => panic!("expected a redirect"),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_a_noop() {
        let checkout = checkout(FakeGateway::failing());
        let mut cart = Cart::new();
        cart.open();

        let outcome = checkout.run(&mut cart, CheckoutDetails::default()).await.unwrap();

        assert!(matches!(outcome, CheckoutOutcome::EmptyCart));
        assert_eq!(checkout.gateway.calls(), 0);
        assert!(cart.is_open());
    }

    #[tokio::test]
    async fn test_success_opens_provider_url_and_clears_cart() {
        let checkout = checkout(FakeGateway::ok("https://checkout.gelato.com/orders/g-1"));
        let mut cart = cart_with_two_black_mediums();

        let redirect = redirect(checkout.run(&mut cart, CheckoutDetails::default()).await.unwrap());

        assert_eq!(redirect.path, CheckoutPath::Provider);
        assert_eq!(
            redirect.checkout_url.as_str(),
            "https://checkout.gelato.com/orders/g-1"
        );
        assert_eq!(redirect.total.amount.to_string(), "49.98");
        assert!(cart.is_empty());
        assert!(!cart.is_open());
    }

    #[tokio::test]
    async fn test_payload_has_variant_code_and_absolute_image() {
        let checkout = checkout(FakeGateway::ok("https://checkout.gelato.com/orders/g-1"));
        let mut cart = cart_with_two_black_mediums();

        checkout.run(&mut cart, CheckoutDetails::default()).await.unwrap();

        let seen = checkout.gateway.seen.lock().unwrap();
        let item = &seen[0].order_items[0];
        assert_eq!(item.product_id, "tshirt-basic");
        assert_eq!(item.product_code, "no-days-off-M-black");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.files[0].url, "https://cluelessfitness.test/teefront2.jpeg");
        assert!(OrderReference::parse(&seen[0].order_reference_id).is_ok());
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_once() {
        let checkout = checkout(FakeGateway::failing());
        let mut cart = cart_with_two_black_mediums();

        let redirect = redirect(checkout.run(&mut cart, CheckoutDetails::default()).await.unwrap());
        let url = redirect.checkout_url.as_str();

        assert_eq!(checkout.gateway.calls(), 1);
        assert_eq!(redirect.path, CheckoutPath::Fallback);
        assert!(url.starts_with("https://www.gelato.com/custom/checkout?ref=CF-"));
        assert!(url.contains(&format!("ref={}", redirect.order_reference)));
        assert!(url.contains("currency=GBP&country=GB"));
        assert!(url.contains("product_0=NO+DAYS+OFF&size_0=M&color_0=Black"));
        assert!(url.contains("price_0=24.99&quantity_0=2"));
        assert!(cart.is_empty());
        assert!(!cart.is_open());
    }

    #[tokio::test]
    async fn test_unusable_provider_url_uses_fallback_url() {
        let checkout = checkout(FakeGateway::ok("not a url"));
        let mut cart = cart_with_two_black_mediums();

        let redirect = redirect(checkout.run(&mut cart, CheckoutDetails::default()).await.unwrap());

        assert_eq!(redirect.path, CheckoutPath::Provider);
        assert!(redirect.checkout_url.as_str().contains("price_0=24.99"));
    }

    #[tokio::test]
    async fn test_payload_error_leaves_cart_untouched() {
        let checkout = checkout(FakeGateway::failing());
        let mut product = Catalog::builtin().get("no-days-off").unwrap().clone();
        product.images = vec!["http://[broken".to_string()];
        let mut cart = Cart::new();
        cart.add_item(
            &product,
            &product.sizes[0].clone(),
            &product.colors[0].clone(),
            1,
        );
        cart.open();
        let before = cart.clone();

        let result = checkout.run(&mut cart, CheckoutDetails::default()).await;

        assert!(matches!(result, Err(CheckoutError::ImageUrl { .. })));
        assert_eq!(cart, before);
        assert_eq!(checkout.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_product_without_image_is_rejected() {
        let checkout = checkout(FakeGateway::failing());
        let mut product = Catalog::builtin().get("no-days-off").unwrap().clone();
        product.images.clear();
        let mut cart = Cart::new();
        cart.add_item(
            &product,
            &product.sizes[0].clone(),
            &product.colors[0].clone(),
            1,
        );

        let result = checkout.run(&mut cart, CheckoutDetails::default()).await;

        assert!(matches!(result, Err(CheckoutError::MissingImage(_))));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        let base = Url::parse("https://cluelessfitness.test/shop/").unwrap();
        assert_eq!(
            absolute_url(&base, "https://cdn.test/a.png").unwrap().as_str(),
            "https://cdn.test/a.png"
        );
        assert_eq!(
            absolute_url(&base, "/teefront.jpeg").unwrap().as_str(),
            "https://cluelessfitness.test/teefront.jpeg"
        );
    }
}
