//! # shop-core
//!
//! Core types for the kitshop storefront.
//!
//! This crate provides:
//! - `Product`, `ProductCatalog` and `CatalogQuery` for the catalog and its search
//! - `Cart` and `CartLine` for cart contents
//! - `TieredPromotion`, the tiered cheapest-unit-free promotion engine
//! - `PricingPolicy` trait for swapping pricing rules
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use shop_core::{apply_promotion, CartLine, PromotionTier};
//!
//! let lines = vec![
//!     CartLine::new("home:M", "Home Jersey (M)", 8999, 2),
//!     CartLine::new("scarf", "Scarf", 1999, 1),
//! ];
//!
//! let result = apply_promotion(&lines);
//! assert_eq!(result.tier, PromotionTier::Buy2Get3);
//! assert_eq!(result.lines[1].free_qty, 1); // the scarf is the cheapest unit
//! assert_eq!(result.shipping_fee, 0);
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod policy;
pub mod promotion;
pub mod rules;

// Re-exports for convenience
pub use cart::{Cart, CartItemRequest, CartLine};
pub use catalog::{CatalogQuery, Category, Product, ProductCatalog};
pub use error::{ShopError, ShopResult};
pub use money::{display_minor, Currency, Price};
pub use policy::{BoxedPricingPolicy, PricingPolicy};
pub use promotion::{apply_promotion, PricedLine, PromotionResult, TieredPromotion};
pub use rules::{PromotionRules, PromotionTier, TierRule, MAX_FREE_UNITS};
