//! Integration tests for the Clueless Fitness storefront.
//!
//! Each test starts the real storefront router on an ephemeral port, next to
//! a fake Gelato API built with axum, and drives it over HTTP with a
//! cookie-carrying `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p clueless-fitness-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use clueless_fitness_core::CurrencyCode;
use clueless_fitness_storefront::config::{
    CheckoutConfig, DEFAULT_CHECKOUT_FALLBACK_URL, DEFAULT_STATIC_DIR, GelatoConfig,
    StorefrontConfig,
};
use clueless_fitness_storefront::{app, state::AppState};
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

/// Public site URL the storefront under test believes it serves.
pub const SITE_URL: &str = "http://shop.cluelessfitness.test";

/// A running storefront and a client bound to its session.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
}

impl TestContext {
    /// Start a storefront talking to the provider at `gelato_url`.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot be started.
    pub async fn start(gelato_url: &str, api_key: Option<&str>) -> Self {
        let state = AppState::new(config(gelato_url, api_key)).expect("Failed to build state");
        let storefront_url = serve(app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Add a catalog variant to this session's cart.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or is rejected.
    pub async fn add_to_cart(&self, product_id: &str, size: &str, color: &str, quantity: u32) {
        let quantity = quantity.to_string();
        let response = self
            .client
            .post(self.url("/cart/add"))
            .form(&[
                ("product_id", product_id),
                ("size", size),
                ("color", color),
                ("quantity", quantity.as_str()),
            ])
            .send()
            .await
            .expect("Failed to add to cart");

        assert!(
            response.status().is_success(),
            "add to cart failed: {}",
            response.status()
        );
    }

    /// This session's cart summary.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn cart_summary(&self) -> serde_json::Value {
        self.client
            .get(self.url("/cart/summary"))
            .send()
            .await
            .expect("Failed to get cart summary")
            .json()
            .await
            .expect("Cart summary was not JSON")
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// # Panics
///
/// Panics if the port cannot be bound.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    format!("http://{addr}")
}

/// Storefront configuration for tests: no delay, plain-HTTP site URL.
///
/// # Panics
///
/// Panics if the built-in URLs fail to parse.
#[must_use]
pub fn config(gelato_url: &str, api_key: Option<&str>) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: Url::parse(SITE_URL).expect("valid site URL"),
        gelato: GelatoConfig {
            api_key: api_key.map(SecretString::from),
            api_base_url: gelato_url.to_string(),
        },
        checkout: CheckoutConfig {
            fallback_url: Url::parse(DEFAULT_CHECKOUT_FALLBACK_URL).expect("valid fallback URL"),
            currency: CurrencyCode::GBP,
            country: "GB".to_string(),
            simulated_delay: Duration::ZERO,
        },
        static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
