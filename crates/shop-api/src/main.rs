//! # kitshop
//!
//! Storefront API server.
//!
//! ## Usage
//!
//! ```bash
//! # Optional overrides
//! export PORT=8080
//! export CATALOG_PATH=config/products.toml
//! export PROMOTIONS_PATH=config/promotions.toml
//!
//! # Run the server
//! kitshop
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!(
        "kitshop v{} ({})",
        env!("CARGO_PKG_VERSION"),
        state.config.environment
    );
    info!(
        "Catalog: {} products, {} active",
        state.catalog.len(),
        state.catalog.active_products().count()
    );
    info!(
        "Pricing policy: {} ({} tiers)",
        state.policy.name(),
        state.policy.rules().tiers.len()
    );

    let app = routes::create_router(state);

    info!("Listening on http://{}", addr);

    if !is_prod {
        info!("Products: GET http://{}/api/v1/products", addr);
        info!("Quote: POST http://{}/api/v1/cart/quote", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
