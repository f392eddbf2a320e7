//! Gelato print-on-demand API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`, JSON bodies, multipart for file uploads
//! - Authenticates every call with the configured key in `X-API-Key`
//! - A missing key fails before any request is built
//! - Product lookups are cached in-memory via `moka` (5 minute TTL)
//! - No retries: callers decide what a failure means
//!
//! The multi-scheme authentication check lives in [`diagnostics`] and builds
//! its own requests; nothing on the order path shares it.
//!
//! # Example
//!
//! ```rust,ignore
//! use clueless_fitness_storefront::gelato::GelatoClient;
//!
//! let client = GelatoClient::new(&config.gelato)?;
//! let confirmation = client.create_order(&order).await?;
//! println!("pay at {}", confirmation.checkout_url);
//! ```

pub mod diagnostics;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use clueless_fitness_core::{OrderConfirmation, OrderRequest};
use moka::future::Cache;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GelatoConfig;

pub use types::{CreateOrderBody, CreateOrderResponse, FileUpload};

/// Header carrying the API key on the order path.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Longest provider error body kept in logs and error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Errors that can occur when interacting with the Gelato API.
#[derive(Debug, Error)]
pub enum GelatoError {
    /// No API key is configured.
    #[error("Gelato API key is not configured")]
    MissingApiKey,

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("Gelato API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GelatoError {
    /// Provider HTTP status, when the provider answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a configuration problem rather than a remote failure.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }
}

/// Client for the Gelato REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct GelatoClient {
    inner: Arc<GelatoClientInner>,
}

struct GelatoClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    cache: Cache<String, serde_json::Value>,
}

impl GelatoClient {
    /// Create a new Gelato API client.
    ///
    /// Succeeds without an API key; calls then fail with
    /// [`GelatoError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GelatoConfig) -> Result<Self, GelatoError> {
        let cache = Cache::builder()
            .max_capacity(200)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(GelatoClientInner {
                client,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
                cache,
            }),
        })
    }

    /// The REST base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn api_key(&self) -> Result<&str, GelatoError> {
        self.inner
            .api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or(GelatoError::MissingApiKey)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Create an order.
    ///
    /// Billing is set to the shipping address; currency is GBP and shipping is
    /// standard. When the provider returns no checkout URL one is synthesized
    /// from the order id.
    ///
    /// # Errors
    ///
    /// Returns [`GelatoError::MissingApiKey`] without sending anything when no
    /// key is configured, [`GelatoError::Api`] with the provider's status and
    /// message on a non-success response.
    #[instrument(
        skip(self, order),
        fields(order_ref = %order.order_reference_id, items = order.order_items.len())
    )]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, GelatoError> {
        let api_key = self.api_key()?;
        debug!("Creating Gelato order");

        let response = self
            .inner
            .client
            .post(self.url("/orders"))
            .header(API_KEY_HEADER, api_key)
            .json(&CreateOrderBody::from(order))
            .send()
            .await?;

        let response = check_status(response).await?;
        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| GelatoError::Parse(e.to_string()))?;

        tracing::info!(gelato_order_id = %created.id, "Gelato order created");
        Ok(created.into())
    }

    /// List provider products (cached).
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<serde_json::Value, GelatoError> {
        self.get_json_cached("products".to_string(), "/products")
            .await
    }

    /// Fetch one provider product (cached).
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &str) -> Result<serde_json::Value, GelatoError> {
        self.get_json_cached(
            format!("product:{product_id}"),
            &format!("/products/{product_id}"),
        )
        .await
    }

    async fn get_json_cached(
        &self,
        cache_key: String,
        path: &str,
    ) -> Result<serde_json::Value, GelatoError> {
        let api_key = self.api_key()?;

        if let Some(value) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for {cache_key}");
            return Ok(value);
        }

        let response = self
            .inner
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let value: serde_json::Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GelatoError::Parse(e.to_string()))?;

        self.inner.cache.insert(cache_key, value.clone()).await;
        Ok(value)
    }

    /// Upload a design file for a product.
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing, the content type is not a valid
    /// MIME type, or the API request fails.
    #[instrument(skip(self, file), fields(file_name = %file.file_name, product_id = %product_id))]
    pub async fn upload_file(
        &self,
        file: FileUpload,
        product_id: &str,
    ) -> Result<serde_json::Value, GelatoError> {
        let api_key = self.api_key()?;

        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("productId", product_id.to_string());

        let response = self
            .inner
            .client
            .post(self.url("/files"))
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GelatoError::Parse(e.to_string()))
    }
}

/// Turn a non-success response into [`GelatoError::Api`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GelatoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    tracing::error!(
        status = %status,
        body = %body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>(),
        "Gelato API returned non-success status"
    );

    Err(GelatoError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human-readable message out of a provider error body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<types::ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
    {
        return message;
    }

    if body.trim().is_empty() {
        return "(empty response body)".to_string();
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
