//! # Request Handlers
//!
//! Axum request handlers for the storefront API: catalog browsing and
//! cart pricing.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_core::{
    display_minor, Cart, CartItemRequest, CartLine, CatalogQuery, Currency, PricedLine,
    PromotionResult, PromotionTier, ShopError,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Cart quote request
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Items to price
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
}

/// Promotion preview request with caller-supplied lines
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

/// An amount in minor units with its display form
#[derive(Debug, Serialize)]
pub struct Amount {
    pub amount: u64,
    pub display: String,
}

impl Amount {
    fn new(amount: u64, currency: Currency) -> Self {
        Self {
            amount,
            display: display_minor(amount, currency),
        }
    }
}

/// One priced line in a quote
#[derive(Debug, Serialize)]
pub struct QuoteLine {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub unit_price: Amount,
    pub quantity: u64,
    pub pay_qty: u64,
    pub free_qty: u64,
    pub line_total: Amount,
}

impl QuoteLine {
    fn from_priced(priced: &PricedLine, currency: Currency) -> Self {
        Self {
            id: priced.line.id.clone(),
            name: priced.line.name.clone(),
            image_url: priced.line.image_url.clone(),
            unit_price: Amount::new(priced.line.unit_price, currency),
            quantity: priced.line.quantity,
            pay_qty: priced.pay_qty,
            free_qty: priced.free_qty,
            line_total: Amount::new(priced.payable(), currency),
        }
    }
}

/// Cart quote response
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote_id: Uuid,
    pub quoted_at: DateTime<Utc>,
    pub currency: Currency,
    pub tier: PromotionTier,
    pub free_items_applied: u64,
    pub lines: Vec<QuoteLine>,
    pub subtotal: Amount,
    pub discount: Amount,
    pub shipping: Amount,
    pub free_shipping: bool,
    pub total: Amount,
}

impl QuoteResponse {
    fn new(result: &PromotionResult, currency: Currency) -> Self {
        Self {
            quote_id: Uuid::new_v4(),
            quoted_at: Utc::now(),
            currency,
            tier: result.tier,
            free_items_applied: result.free_items_applied,
            lines: result
                .lines
                .iter()
                .map(|l| QuoteLine::from_priced(l, currency))
                .collect(),
            subtotal: Amount::new(result.subtotal(), currency),
            discount: Amount::new(result.discount(), currency),
            shipping: Amount::new(result.shipping_fee, currency),
            free_shipping: result.has_free_shipping(),
            total: Amount::new(result.total(), currency),
        }
    }
}

/// Promotion preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub result: PromotionResult,
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn shop_error_to_response(err: ShopError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "kitshop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Search the catalog (`q`, `category`, `team`, `size`)
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let products = state.catalog.search(&query);
    Json(serde_json::json!({
        "products": products,
        "count": products.len(),
        "teams": state.catalog.teams()
    }))
}

/// Get single product; inactive products are hidden as in search
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .get(&product_id)
        .filter(|p| p.active)
        .ok_or_else(|| shop_error_to_response(ShopError::ProductNotFound { product_id }))?;

    Ok(Json(product.clone()))
}

/// Promotion rules in effect
pub async fn get_promotions(State(state): State<AppState>) -> impl IntoResponse {
    let rules = state.policy.rules();
    Json(serde_json::json!({
        "policy": state.policy.name(),
        "tiers": rules.tiers,
        "max_free_units": shop_core::MAX_FREE_UNITS,
        "flat_shipping_fee": Amount::new(rules.flat_shipping_fee, state.config.currency),
    }))
}

/// Price a cart built from catalog products
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn quote_cart(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let cart = Cart::from_request(&state.catalog, &request.items, state.config.currency)
        .map_err(|e| {
            warn!("Rejected cart: {}", e);
            shop_error_to_response(e)
        })?;

    let result = state.policy.price(cart.lines());
    let response = QuoteResponse::new(&result, cart.currency);

    info!(
        "Quoted cart {}: {} items, tier={}, total={}",
        response.quote_id,
        cart.item_count(),
        result.tier,
        response.total.display
    );

    Ok(Json(response))
}

/// Price raw cart lines; malformed amounts are coerced to zero
#[instrument(skip(state, request), fields(lines = request.lines.len()))]
pub async fn preview_promotion(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> impl IntoResponse {
    let result = state.policy.price(&request.lines);
    Json(PreviewResponse {
        subtotal: result.subtotal(),
        discount: result.discount(),
        total: result.total(),
        result,
    })
}
