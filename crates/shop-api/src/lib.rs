//! # shop-api
//!
//! HTTP API layer for the kitshop storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Catalog search endpoints
//! - Cart pricing with the tiered promotion
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/products` | Search products |
//! | GET | `/api/v1/products/{id}` | Get product |
//! | GET | `/api/v1/promotions` | Promotion rules |
//! | POST | `/api/v1/cart/quote` | Price a cart |
//! | POST | `/api/v1/promotions/preview` | Price raw cart lines |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, ConfigError};
