//! # Pricing Policy Trait
//!
//! Strategy seam between the storefront and its promotion rules.
//! Callers hold a [`BoxedPricingPolicy`] and never name the concrete engine,
//! so the business rule can change without touching cart or HTTP code.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            PricingPolicy (trait)            │
//! │  ├── price()                                │
//! │  ├── rules()                                │
//! │  └── name()                                 │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!              ┌────────┴────────┐
//!              │ TieredPromotion │
//!              └─────────────────┘
//! ```

use crate::cart::CartLine;
use crate::promotion::{PromotionResult, TieredPromotion};
use crate::rules::PromotionRules;
use std::sync::Arc;

/// Prices cart lines. Implementations must be pure: the same lines always
/// price the same way, and concurrent calls share no mutable state.
pub trait PricingPolicy: Send + Sync {
    /// Price the lines of a cart
    fn price(&self, lines: &[CartLine]) -> PromotionResult;

    /// Rules in effect, for display
    fn rules(&self) -> &PromotionRules;

    /// Policy name (for logging)
    fn name(&self) -> &'static str;
}

/// Type alias for a shared pricing policy (dynamic dispatch)
pub type BoxedPricingPolicy = Arc<dyn PricingPolicy>;

impl PricingPolicy for TieredPromotion {
    fn price(&self, lines: &[CartLine]) -> PromotionResult {
        self.apply(lines)
    }

    fn rules(&self) -> &PromotionRules {
        TieredPromotion::rules(self)
    }

    fn name(&self) -> &'static str {
        "tiered_cheapest_free"
    }
}
