//! Provider connectivity check.
//!
//! Tries each authentication scheme the provider has been known to accept,
//! in order, against `GET /products` and stops at the first success. This is
//! troubleshooting tooling for `/api/gelato/test` and `cf-cli gelato test`;
//! the order client never falls back between schemes.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{API_KEY_HEADER, GelatoError};
use crate::config::GelatoConfig;

/// An authentication header scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthScheme {
    /// `X-API-Key: <key>`
    #[serde(rename = "X-API-Key")]
    ApiKeyHeader,
    /// `Authorization: Bearer <key>`
    #[serde(rename = "Authorization Bearer")]
    Bearer,
    /// `Authorization: Basic base64(<key>:)`
    #[serde(rename = "Authorization Basic")]
    Basic,
}

impl AuthScheme {
    /// Probe order.
    pub const ALL: [Self; 3] = [Self::ApiKeyHeader, Self::Bearer, Self::Basic];

    /// Human-readable scheme name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApiKeyHeader => "X-API-Key",
            Self::Bearer => "Authorization Bearer",
            Self::Basic => "Authorization Basic",
        }
    }

    /// Header name and value carrying `key` under this scheme.
    fn header(self, key: &str) -> Result<(HeaderName, HeaderValue), String> {
        let (name, value) = match self {
            Self::ApiKeyHeader => (HeaderName::from_static("x-api-key"), key.to_string()),
            Self::Bearer => (AUTHORIZATION, format!("Bearer {key}")),
            Self::Basic => (
                AUTHORIZATION,
                format!("Basic {}", BASE64.encode(format!("{key}:"))),
            ),
        };
        let value = HeaderValue::from_str(&value).map_err(|e| e.to_string())?;
        Ok((name, value))
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One scheme's result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeAttempt {
    pub scheme: AuthScheme,
    /// HTTP status, when the provider answered.
    pub status: Option<u16>,
    /// Why the attempt failed; `None` on success.
    pub error: Option<String>,
}

/// Outcome of [`test_connection`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    /// The first scheme that worked.
    pub method: Option<AuthScheme>,
    /// Number of products listed by the successful call.
    pub products_count: Option<usize>,
    pub attempts: Vec<ProbeAttempt>,
}

/// Probe the provider with each auth scheme until one works.
///
/// Attempts run sequentially and stop at the first 2xx response.
///
/// # Errors
///
/// Returns [`GelatoError::MissingApiKey`] before any request when no key is
/// configured, or [`GelatoError::Http`] if the HTTP client cannot be built.
/// Per-scheme failures are reported in the [`ConnectionReport`], not as errors.
#[instrument(skip(config), fields(base_url = %config.api_base_url))]
pub async fn test_connection(config: &GelatoConfig) -> Result<ConnectionReport, GelatoError> {
    let key = config
        .api_key
        .as_ref()
        .ok_or(GelatoError::MissingApiKey)?
        .expose_secret();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;
    let url = format!("{}/products", config.api_base_url.trim_end_matches('/'));

    info!("Testing Gelato API connection");
    let mut attempts = Vec::with_capacity(AuthScheme::ALL.len());

    for scheme in AuthScheme::ALL {
        let (name, value) = match scheme.header(key) {
            Ok(header) => header,
            Err(error) => {
                warn!(scheme = %scheme, %error, "Cannot encode key for scheme");
                attempts.push(ProbeAttempt {
                    scheme,
                    status: None,
                    error: Some(error),
                });
                continue;
            }
        };

        match client.get(&url).header(name, value).send().await {
            Ok(response) if response.status().is_success() => {
                let status = response.status().as_u16();
                let products_count = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| count_products(&body));

                info!(scheme = %scheme, status, ?products_count, "Authentication succeeded");
                attempts.push(ProbeAttempt {
                    scheme,
                    status: Some(status),
                    error: None,
                });
                return Ok(ConnectionReport {
                    success: true,
                    method: Some(scheme),
                    products_count,
                    attempts,
                });
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                warn!(scheme = %scheme, status, body = %body.chars().take(200).collect::<String>(), "Authentication failed");
                attempts.push(ProbeAttempt {
                    scheme,
                    status: Some(status),
                    error: Some(format!("HTTP {status}")),
                });
            }
            Err(e) => {
                warn!(scheme = %scheme, error = %e, "Request failed");
                attempts.push(ProbeAttempt {
                    scheme,
                    status: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(ConnectionReport {
        success: false,
        method: None,
        products_count: None,
        attempts,
    })
}

/// Product count from either `{"products": [...]}` or a bare array.
fn count_products(body: &serde_json::Value) -> Option<usize> {
    body.get("products")
        .and_then(serde_json::Value::as_array)
        .or_else(|| body.as_array())
        .map(Vec::len)
}
