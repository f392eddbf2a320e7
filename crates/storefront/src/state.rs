//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::gelato::{GelatoClient, GelatoError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the provider client, catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gelato: GelatoClient,
    catalog: Catalog,
    checkout: Checkout<GelatoClient>,
}

impl AppState {
    /// Create a new application state with the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the Gelato HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, GelatoError> {
        Self::with_catalog(config, Catalog::builtin())
    }

    /// Create a new application state with an explicit catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the Gelato HTTP client cannot be built.
    pub fn with_catalog(config: StorefrontConfig, catalog: Catalog) -> Result<Self, GelatoError> {
        let gelato = GelatoClient::new(&config.gelato)?;
        let checkout = Checkout::new(
            gelato.clone(),
            config.base_url.clone(),
            config.checkout.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                gelato,
                catalog,
                checkout,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Gelato API client.
    #[must_use]
    pub fn gelato(&self) -> &GelatoClient {
        &self.inner.gelato
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &Checkout<GelatoClient> {
        &self.inner.checkout
    }
}
