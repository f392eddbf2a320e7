//! CLI subcommand implementations.

pub mod config;
pub mod gelato;

use clueless_fitness_storefront::config::ConfigError;
use clueless_fitness_storefront::gelato::GelatoError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The provider call failed.
    #[error("Gelato error: {0}")]
    Gelato(#[from] GelatoError),

    /// Every auth scheme was rejected.
    #[error("All {0} authentication methods failed")]
    ConnectionFailed(usize),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
