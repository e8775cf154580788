//! # shop-wasm
//!
//! WebAssembly bindings for kitshop.
//!
//! Lets the storefront price the cart in the browser with the same engine
//! the API uses, so the cart drawer can show free items and shipping before
//! the shopper asks for a quote.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { preview_cart, promotion_hint } from 'kitshop-wasm';
//!
//! await init();
//!
//! const result = preview_cart([
//!   { id: 'boca-home-2024:M', name: 'Boca Home (M)', unit_price: 8999, quantity: 2 },
//!   { id: 'boca-scarf', name: 'Scarf', unit_price: 1999, quantity: 1 },
//! ]);
//!
//! console.log(result.tier, result.free_items_applied, result.shipping_fee);
//! console.log(promotion_hint(2).message); // "Add 1 more item to get 1 free"
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use serde::Serialize;
use shop_core::{apply_promotion, display_minor, CartLine, Currency, PromotionRules};
use wasm_bindgen::prelude::*;

/// Cart line for the WASM interface
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmCartLine {
    id: String,
    name: String,
    price_cents: i64,
    quantity: i64,
}

#[wasm_bindgen]
impl WasmCartLine {
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, name: String, price_cents: i64, quantity: i64) -> Self {
        Self {
            id,
            name,
            price_cents,
            quantity,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    #[wasm_bindgen(getter)]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Line total in cents before promotions
    #[wasm_bindgen]
    pub fn total_cents(&self) -> u64 {
        self.to_cart_line().line_total()
    }
}

impl WasmCartLine {
    fn to_cart_line(&self) -> CartLine {
        CartLine::new(
            self.id.clone(),
            self.name.clone(),
            self.price_cents,
            self.quantity,
        )
    }
}

/// Progress towards the next promotion tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionHint {
    pub current_tier: String,
    /// Items to add before the next tier applies; 0 at the top tier
    pub items_needed: u64,
    /// Free units the next tier grants
    pub next_free_units: u64,
    pub message: String,
}

/// Work out the next-tier hint for a cart holding `total_quantity` units
pub fn hint_for(rules: &PromotionRules, total_quantity: u64) -> PromotionHint {
    let (current, current_free) = rules.tier_for(total_quantity);
    let current_free = current_free.min(shop_core::MAX_FREE_UNITS);

    let next = rules
        .tiers
        .iter()
        .filter(|rule| rule.min_quantity > total_quantity)
        .filter(|rule| rule.free_units.min(shop_core::MAX_FREE_UNITS) > current_free)
        .min_by_key(|rule| rule.min_quantity);

    match next {
        Some(rule) => {
            let items_needed = rule.min_quantity - total_quantity;
            let next_free_units = rule.free_units.min(shop_core::MAX_FREE_UNITS);
            PromotionHint {
                current_tier: current.to_string(),
                items_needed,
                next_free_units,
                message: format!(
                    "Add {} more item{} to get {} free",
                    items_needed,
                    if items_needed == 1 { "" } else { "s" },
                    next_free_units
                ),
            }
        }
        None => PromotionHint {
            current_tier: current.to_string(),
            items_needed: 0,
            next_free_units: current_free,
            message: if current.is_active() {
                format!("{} free item{} applied", current_free, if current_free == 1 { "" } else { "s" })
            } else {
                String::new()
            },
        },
    }
}

/// Price cart lines in the browser.
///
/// Accepts an array of `{ id, name, unit_price, quantity, image_url? }`;
/// malformed amounts are treated as zero.
#[wasm_bindgen]
pub fn preview_cart(lines: JsValue) -> Result<JsValue, JsValue> {
    let lines: Vec<CartLine> = serde_wasm_bindgen::from_value(lines)
        .map_err(|e| JsValue::from_str(&format!("Invalid cart lines: {}", e)))?;

    let result = apply_promotion(&lines);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Price lines built with [`WasmCartLine`]; returns the amount due in cents
#[wasm_bindgen]
pub fn cart_total_cents(lines: Vec<WasmCartLine>) -> u64 {
    let lines: Vec<CartLine> = lines.iter().map(WasmCartLine::to_cart_line).collect();
    apply_promotion(&lines).total()
}

/// Next-tier hint with the default promotion rules
#[wasm_bindgen]
pub fn promotion_hint(total_quantity: u32) -> Result<JsValue, JsValue> {
    let hint = hint_for(&PromotionRules::default(), u64::from(total_quantity));
    serde_wasm_bindgen::to_value(&hint).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a price in cents to display string
#[wasm_bindgen]
pub fn format_price(cents: u64) -> String {
    display_minor(cents, Currency::USD)
}

/// Validate a product ID format
#[wasm_bindgen]
pub fn validate_product_id(product_id: &str) -> bool {
    !product_id.is_empty()
        && product_id.len() <= 100
        && product_id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
