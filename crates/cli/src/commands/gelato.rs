//! Gelato API diagnostics.
//!
//! # Environment Variables
//!
//! - `GELATO_API_KEY` - Provider API key (required)
//! - `GELATO_API_BASE_URL` - Provider REST base (optional)

use clueless_fitness_storefront::config::GelatoConfig;
use clueless_fitness_storefront::gelato::GelatoClient;
use clueless_fitness_storefront::gelato::diagnostics::test_connection;

use super::CommandError;

/// Probe the provider with each auth scheme and report which one works.
///
/// # Errors
///
/// Returns an error if the key is missing or every scheme fails.
pub async fn test() -> Result<(), CommandError> {
    let config = GelatoConfig::from_env()?;
    tracing::info!("Testing Gelato API at {}", config.api_base_url);

    let report = test_connection(&config).await?;

    for attempt in &report.attempts {
        match &attempt.error {
            None => tracing::info!(status = ?attempt.status, "{}: ok", attempt.scheme),
            Some(error) => tracing::warn!(status = ?attempt.status, "{}: {error}", attempt.scheme),
        }
    }

    match report.method {
        Some(method) => {
            tracing::info!(
                products = ?report.products_count,
                "Gelato API connection successful using {method}"
            );
            Ok(())
        }
        None => Err(CommandError::ConnectionFailed(report.attempts.len())),
    }
}

/// Print the provider product list as pretty JSON.
///
/// # Errors
///
/// Returns an error if the key is missing or the request fails.
pub async fn products() -> Result<(), CommandError> {
    let client = GelatoClient::new(&GelatoConfig::from_env()?)?;
    tracing::info!("Fetching products from {}", client.base_url());
    let products = client.get_products().await?;
    emit(&products)
}

/// Print one provider product as pretty JSON.
///
/// # Errors
///
/// Returns an error if the key is missing or the request fails.
pub async fn product(id: &str) -> Result<(), CommandError> {
    let client = GelatoClient::new(&GelatoConfig::from_env()?)?;
    tracing::info!("Fetching product {id} from {}", client.base_url());
    let product = client.get_product(id).await?;
    emit(&product)
}

#[allow(clippy::print_stdout)]
fn emit(value: &serde_json::Value) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
