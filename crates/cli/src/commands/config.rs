//! Configuration and catalog inspection.

use clueless_fitness_core::Price;
use clueless_fitness_storefront::catalog::Catalog;
use clueless_fitness_storefront::config::StorefrontConfig;

use super::CommandError;

/// Load the storefront configuration and log a redacted summary.
///
/// # Errors
///
/// Returns an error if any variable is invalid.
pub fn check() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!(
        listen = %config.socket_addr(),
        base_url = %config.base_url,
        gelato_api = %config.gelato.api_base_url,
        gelato_key = config.gelato.api_key.is_some(),
        fallback = %config.checkout.fallback_url,
        delay_ms = config.checkout.simulated_delay.as_millis(),
        static_dir = %config.static_dir.display(),
        sentry = config.sentry_dsn.is_some(),
        "Configuration OK"
    );

    if !config.static_dir.is_dir() {
        tracing::warn!(
            static_dir = %config.static_dir.display(),
            "STATIC_DIR does not exist; product images will 404"
        );
    }
    if config.gelato.api_key.is_none() {
        tracing::warn!("GELATO_API_KEY is not set; checkouts will always use the fallback URL");
    }
    Ok(())
}

/// Log every product in the built-in catalog with its variants.
pub fn catalog() {
    let catalog = Catalog::builtin();

    for product in catalog.all() {
        let sizes: Vec<&str> = product.sizes.iter().map(|s| s.code.as_str()).collect();
        let colors: Vec<&str> = product.colors.iter().map(|c| c.name.as_str()).collect();
        tracing::info!(
            id = %product.id,
            price = %Price::new(product.price, product.currency),
            provider_product = product.provider_product_id(),
            sizes = ?sizes,
            colors = ?colors,
            "{}",
            product.name
        );
    }
}
