//! # Shop Error Types
//!
//! Typed error handling for kitshop catalog and cart operations.
//! The promotion engine never fails; these errors come from resolving
//! requests against the catalog and from loading configuration.

use thiserror::Error;

/// Core error type for catalog, cart and configuration operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (unreadable files, invalid rules)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Product exists but is not for sale
    #[error("Product is not available: {product_id}")]
    ProductUnavailable { product_id: String },

    /// Requested size is not offered for the product
    #[error("Size {size} is not offered for product {product_id}")]
    UnknownSize { product_id: String, size: String },
}

impl ShopError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::ProductUnavailable { .. } => 409,
            ShopError::UnknownSize { .. } => 400,
        }
    }
}

impl From<toml::de::Error> for ShopError {
    fn from(err: toml::de::Error) -> Self {
        ShopError::Configuration(err.to_string())
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
