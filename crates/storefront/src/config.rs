//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for order creation
//! - `GELATO_API_KEY` - Fulfillment provider API key. Loading succeeds without
//!   it; the first provider call then fails with a configuration error.
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL of the site, used to turn relative
//!   image paths into absolute URLs (default: <http://localhost:3000>)
//! - `GELATO_API_BASE_URL` - Provider REST base (default: <https://api.gelato.com/v1>)
//! - `CHECKOUT_FALLBACK_URL` - Manual checkout page used when order creation
//!   fails (default: <https://www.gelato.com/custom/checkout>)
//! - `CHECKOUT_SIMULATED_DELAY_MS` - Processing delay before order creation
//!   (default: 1000)
//! - `STATIC_DIR` - Directory of product images and other static files
//!   (default: this crate's `static/` directory)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clueless_fitness_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default provider REST base URL.
pub const DEFAULT_GELATO_API_BASE_URL: &str = "https://api.gelato.com/v1";

/// Default manual checkout page for the fallback path.
pub const DEFAULT_CHECKOUT_FALLBACK_URL: &str = "https://www.gelato.com/custom/checkout";

/// Static files shipped with the crate.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Fulfillment provider configuration
    pub gelato: GelatoConfig,
    /// Checkout behaviour
    pub checkout: CheckoutConfig,
    /// Directory served for paths no route matches
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Gelato API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GelatoConfig {
    /// API key; `None` when `GELATO_API_KEY` is unset
    pub api_key: Option<SecretString>,
    /// REST base URL without trailing slash
    pub api_base_url: String,
}

impl std::fmt::Debug for GelatoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GelatoConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Checkout settings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Manual checkout page used by the fallback path
    pub fallback_url: Url,
    /// Currency sent on the fallback URL
    pub currency: CurrencyCode,
    /// ISO country code sent on the fallback URL
    pub country: String,
    /// Artificial processing delay before order creation
    pub simulated_delay: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_url("STOREFRONT_BASE_URL", "http://localhost:3000")?;

        let gelato = GelatoConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            gelato,
            checkout,
            static_dir: PathBuf::from(get_env_or_default("STATIC_DIR", DEFAULT_STATIC_DIR)),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GelatoConfig {
    /// Load only the provider settings (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if the key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_key = match get_optional_env("GELATO_API_KEY") {
            Some(value) if !value.trim().is_empty() => {
                validate_secret_strength(&value, "GELATO_API_KEY")?;
                Some(SecretString::from(value))
            }
            _ => None,
        };

        Ok(Self {
            api_key,
            api_base_url: get_env_or_default("GELATO_API_BASE_URL", DEFAULT_GELATO_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let delay_ms = get_env_or_default("CHECKOUT_SIMULATED_DELAY_MS", "1000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "CHECKOUT_SIMULATED_DELAY_MS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            fallback_url: get_url("CHECKOUT_FALLBACK_URL", DEFAULT_CHECKOUT_FALLBACK_URL)?,
            currency: CurrencyCode::GBP,
            country: "GB".to_string(),
            simulated_delay: Duration::from_millis(delay_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable as an absolute URL.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    Url::parse(&get_env_or_default(key, default))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a sampling rate in `[0.0, 1.0]`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Check the key was copied in full."
            ),
        ));
    }

    Ok(())
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-gelato-api-key", "GELATO_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "GELATO_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_accepts_provider_style_key() {
        let result = validate_secret_strength(
            "4f9c2a7e-81b3-4d6f-9a0e-c5b7d2e8f1a3-7c1e9b40-2d5a-46f8",
            "GELATO_API_KEY",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_support::config_with_gelato("http://127.0.0.1:9", None);
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_default_static_dir_holds_catalog_images() {
        let dir = std::path::Path::new(DEFAULT_STATIC_DIR);
        assert!(dir.is_absolute());
        for image in ["teefront.jpeg", "teefront2.jpeg", "teefront3.jpeg"] {
            assert!(dir.join(image).is_file(), "{image}");
        }
    }

    #[test]
    fn test_gelato_client_strips_trailing_slash() {
        let config = GelatoConfig {
            api_key: None,
            api_base_url: "https://api.gelato.test/v1/".to_string(),
        };
        let client = crate::gelato::GelatoClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.gelato.test/v1");
    }

    #[test]
    fn test_gelato_config_debug_redacts_key() {
        let config = GelatoConfig {
            api_key: Some(SecretString::from("super_secret_gelato_key")),
            api_base_url: DEFAULT_GELATO_API_BASE_URL.to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("api.gelato.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_gelato_key"));
    }
}
