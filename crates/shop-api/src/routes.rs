//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Catalog:
///   - GET  /api/v1/products - Search products (`q`, `category`, `team`, `size`)
///   - GET  /api/v1/products/{product_id} - Get product by ID
///
/// - Pricing:
///   - GET  /api/v1/promotions - Promotion rules in effect
///   - POST /api/v1/cart/quote - Price a cart of catalog products
///   - POST /api/v1/promotions/preview - Price raw cart lines
pub fn create_router(state: AppState) -> Router {
    // The storefront is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    let pricing_routes = Router::new()
        .route("/promotions", get(handlers::get_promotions))
        .route("/promotions/preview", post(handlers::preview_promotion))
        .route("/cart/quote", post(handlers::quote_cart));

    let api_routes = Router::new().merge(catalog_routes).merge(pricing_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use shop_core::{
        Category, Currency, Price, Product, ProductCatalog, PromotionRules, TieredPromotion,
    };
    use std::sync::Arc;

    fn test_catalog() -> ProductCatalog {
        ProductCatalog::new()
            .with_product(
                Product::new(
                    "boca-home",
                    "Boca Home",
                    Category::Jersey,
                    Price::from_cents(9000, Currency::USD),
                )
                .with_team("Boca Juniors")
                .with_sizes(["M", "L"]),
            )
            .with_product(
                Product::new(
                    "river-away",
                    "River Away",
                    Category::Jersey,
                    Price::from_cents(8500, Currency::USD),
                )
                .with_team("River Plate")
                .with_sizes(["M"]),
            )
            .with_product(
                Product::new(
                    "scarf",
                    "Boca Scarf",
                    Category::Accessory,
                    Price::from_cents(2000, Currency::USD),
                )
                .with_team("Boca Juniors"),
            )
            .with_product(
                Product::new(
                    "retro",
                    "Boca Retro",
                    Category::Jersey,
                    Price::from_cents(9900, Currency::USD),
                )
                .inactive(),
            )
    }

    fn test_server() -> TestServer {
        let state = AppState::from_parts(
            AppConfig::default(),
            test_catalog(),
            Arc::new(TieredPromotion::new(PromotionRules::default())),
        );
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_server().get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "kitshop");
    }

    #[tokio::test]
    async fn test_search_products() {
        let server = test_server();

        let body: Value = server.get("/api/v1/products").await.json();
        assert_eq!(body["count"], 3);
        assert_eq!(body["teams"], json!(["Boca Juniors", "River Plate"]));

        let body: Value = server
            .get("/api/v1/products")
            .add_query_param("q", "boca")
            .add_query_param("category", "jersey")
            .await
            .json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["products"][0]["id"], "boca-home");

        let body: Value = server
            .get("/api/v1/products")
            .add_query_param("team", "river plate")
            .await
            .json();
        assert_eq!(body["products"][0]["id"], "river-away");
    }

    #[tokio::test]
    async fn test_get_product() {
        let server = test_server();

        let body: Value = server.get("/api/v1/products/scarf").await.json();
        assert_eq!(body["name"], "Boca Scarf");

        let response = server.get("/api/v1/products/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_get_inactive_product_is_hidden() {
        let response = test_server().get("/api/v1/products/retro").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"], "Product not found: retro");
    }

    #[tokio::test]
    async fn test_get_promotions() {
        let body: Value = test_server().get("/api/v1/promotions").await.json();

        assert_eq!(body["policy"], "tiered_cheapest_free");
        assert_eq!(body["max_free_units"], 2);
        assert_eq!(body["flat_shipping_fee"]["display"], "$5.00");
        assert_eq!(body["tiers"][0]["tier"], "BUY_2_GET_3");
    }

    #[tokio::test]
    async fn test_quote_small_cart_pays_shipping() {
        let response = test_server()
            .post("/api/v1/cart/quote")
            .json(&json!({
                "items": [{ "product_id": "boca-home", "size": "M", "quantity": 1 }]
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["tier"], "NONE");
        assert_eq!(body["free_items_applied"], 0);
        assert_eq!(body["shipping"]["amount"], 500);
        assert_eq!(body["free_shipping"], false);
        assert_eq!(body["total"]["amount"], 9500);
        assert_eq!(body["total"]["display"], "$95.00");
    }

    #[tokio::test]
    async fn test_quote_five_items_waives_two_cheapest() {
        let response = test_server()
            .post("/api/v1/cart/quote")
            .json(&json!({
                "items": [
                    { "product_id": "boca-home", "size": "M", "quantity": 2 },
                    { "product_id": "river-away", "size": "M", "quantity": 1 },
                    { "product_id": "scarf", "quantity": 1 },
                    { "product_id": "boca-home", "size": "L", "quantity": 1 }
                ]
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["tier"], "BUY_3_GET_5");
        assert_eq!(body["free_items_applied"], 2);
        // scarf (20.00) and the river shirt (85.00) are the cheapest units
        assert_eq!(body["lines"][1]["free_qty"], 1);
        assert_eq!(body["lines"][2]["free_qty"], 1);
        assert_eq!(body["lines"][0]["free_qty"], 0);
        assert_eq!(body["discount"]["amount"], 10500);
        assert_eq!(body["shipping"]["amount"], 0);
        assert_eq!(body["total"]["amount"], 27000);
    }

    #[tokio::test]
    async fn test_quote_rejects_bad_items() {
        let server = test_server();

        let response = server
            .post("/api/v1/cart/quote")
            .json(&json!({ "items": [{ "product_id": "missing" }] }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/api/v1/cart/quote")
            .json(&json!({ "items": [{ "product_id": "boca-home", "size": "XS" }] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/v1/cart/quote")
            .json(&json!({ "items": [{ "product_id": "retro" }] }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .post("/api/v1/cart/quote")
            .json(&json!({ "items": [] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_coerces_malformed_lines() {
        let response = test_server()
            .post("/api/v1/promotions/preview")
            .json(&json!({
                "lines": [
                    { "id": "a", "name": "A", "unit_price": 10, "quantity": 2 },
                    { "id": "b", "name": "B", "unit_price": 20, "quantity": "1" },
                    { "id": "c", "name": "C", "unit_price": -99, "quantity": -4 }
                ]
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["tier"], "BUY_2_GET_3");
        assert_eq!(body["free_items_applied"], 1);
        assert_eq!(body["lines"][0]["free_qty"], 1);
        assert_eq!(body["lines"][2]["quantity"], 0);
        assert_eq!(body["shipping_fee"], 0);
        assert_eq!(body["subtotal"], 40);
        assert_eq!(body["total"], 30);
    }

    #[tokio::test]
    async fn test_preview_zeroes_nested_amounts() {
        let response = test_server()
            .post("/api/v1/promotions/preview")
            .json(&json!({
                "lines": [
                    { "id": "a", "name": "A", "unit_price": [10], "quantity": { "n": 3 } },
                    { "id": "b", "name": "B", "unit_price": 700, "quantity": 1 }
                ]
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["lines"][0]["unit_price"], 0);
        assert_eq!(body["lines"][0]["quantity"], 0);
        assert_eq!(body["tier"], "NONE");
        assert_eq!(body["shipping_fee"], 500);
        assert_eq!(body["total"], 1200);
    }

    #[tokio::test]
    async fn test_preview_empty_cart() {
        let body: Value = test_server()
            .post("/api/v1/promotions/preview")
            .json(&json!({ "lines": [] }))
            .await
            .json();

        assert_eq!(body["tier"], "NONE");
        assert_eq!(body["shipping_fee"], 0);
        assert_eq!(body["total"], 0);
    }
}
