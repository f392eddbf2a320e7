//! Clueless Fitness CLI - provider diagnostics and configuration checks.
//!
//! # Usage
//!
//! ```bash
//! # Probe the Gelato API with each supported auth scheme
//! cf-cli gelato test
//!
//! # Dump the provider product list as JSON
//! cf-cli gelato products
//!
//! # Dump one provider product
//! cf-cli gelato product tshirt-basic
//!
//! # Validate storefront environment configuration
//! cf-cli config check
//!
//! # List the built-in catalog
//! cf-cli catalog
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(author, version, about = "Clueless Fitness CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gelato API diagnostics
    Gelato {
        #[command(subcommand)]
        action: GelatoAction,
    },
    /// Storefront configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List the built-in product catalog
    Catalog,
}

#[derive(Subcommand)]
enum GelatoAction {
    /// Test connectivity, trying each auth scheme in turn
    Test,
    /// Print the provider's product list
    Products,
    /// Print one provider product
    Product {
        /// Provider product id
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate configuration from the environment
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Gelato { action } => match action {
            GelatoAction::Test => commands::gelato::test().await?,
            GelatoAction::Products => commands::gelato::products().await?,
            GelatoAction::Product { id } => commands::gelato::product(&id).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
        Commands::Catalog => commands::config::catalog(),
    }
    Ok(())
}
