//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the product catalog, the pricing policy and configuration.

use shop_core::{
    BoxedPricingPolicy, Currency, ProductCatalog, PromotionRules, ShopError, TieredPromotion,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ShopError,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Store currency; catalog prices must match it
    pub currency: Currency,
    /// Product catalog file
    pub catalog_path: PathBuf,
    /// Promotion rules file (defaults apply when missing)
    pub promotions_path: PathBuf,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidVar { name: "PORT", value })?,
            Err(_) => 8080,
        };

        let currency = match std::env::var("CURRENCY") {
            Ok(value) => Currency::from_code(&value)
                .ok_or(ConfigError::InvalidVar {
                    name: "CURRENCY",
                    value,
                })?,
            Err(_) => Currency::USD,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            currency,
            catalog_path: std::env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/products.toml")),
            promotions_path: std::env::var("PROMOTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/promotions.toml")),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidVar {
                name: "HOST",
                value: self.host.clone(),
            })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            currency: Currency::USD,
            catalog_path: PathBuf::from("config/products.toml"),
            promotions_path: PathBuf::from("config/promotions.toml"),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Pricing policy applied to every quote
    pub policy: BoxedPricingPolicy,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState from the environment and config files
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let catalog = load_product_catalog(&config.catalog_path)?;
        let rules = load_promotion_rules(&config.promotions_path)?;

        Ok(Self::from_parts(
            config,
            catalog,
            Arc::new(TieredPromotion::new(rules)),
        ))
    }

    /// Assemble state from already-loaded parts
    pub fn from_parts(
        config: AppConfig,
        catalog: ProductCatalog,
        policy: BoxedPricingPolicy,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            policy,
            config,
        }
    }
}

/// Load the product catalog, falling back to an empty catalog
pub fn load_product_catalog(path: &Path) -> Result<ProductCatalog, ConfigError> {
    match read_optional(path)? {
        Some(content) => {
            let catalog = ProductCatalog::from_toml(&content).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            tracing::info!(
                "Loaded {} products from {}",
                catalog.len(),
                path.display()
            );
            Ok(catalog)
        }
        None => {
            tracing::warn!("No product catalog at {}, using empty catalog", path.display());
            Ok(ProductCatalog::new())
        }
    }
}

/// Load promotion rules, falling back to the default tier table
pub fn load_promotion_rules(path: &Path) -> Result<PromotionRules, ConfigError> {
    match read_optional(path)? {
        Some(content) => {
            let rules = PromotionRules::from_toml(&content).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            tracing::info!(
                "Loaded {} promotion tiers from {}",
                rules.tiers.len(),
                path.display()
            );
            Ok(rules)
        }
        None => {
            tracing::info!("No promotion rules at {}, using defaults", path.display());
            Ok(PromotionRules::default())
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
