//! # Promotion Rules
//!
//! The tier table and shipping fee used by the promotion engine.
//! Rules are plain values passed to the engine; they can be loaded from
//! `config/promotions.toml`.

use crate::error::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hard cap on free units per cart, applied after tier selection
/// whatever the tier table says.
pub const MAX_FREE_UNITS: u64 = 2;

/// Flat shipping fee (minor units) charged when no promotion applies
pub const DEFAULT_FLAT_SHIPPING_FEE: u64 = 500;

/// Promotion tier tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionTier {
    #[serde(rename = "NONE")]
    None,
    /// Three items for the price of two
    #[serde(rename = "BUY_2_GET_3")]
    Buy2Get3,
    /// Five items for the price of three
    #[serde(rename = "BUY_3_GET_5")]
    Buy3Get5,
}

impl PromotionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionTier::None => "NONE",
            PromotionTier::Buy2Get3 => "BUY_2_GET_3",
            PromotionTier::Buy3Get5 => "BUY_3_GET_5",
        }
    }

    /// Whether a promotion is in effect
    pub fn is_active(&self) -> bool {
        !matches!(self, PromotionTier::None)
    }
}

impl Default for PromotionTier {
    fn default() -> Self {
        PromotionTier::None
    }
}

impl std::fmt::Display for PromotionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the tier table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: PromotionTier,
    /// Smallest total cart quantity that selects this tier
    pub min_quantity: u64,
    /// Free units granted before the hard cap
    pub free_units: u64,
}

impl TierRule {
    pub fn new(tier: PromotionTier, min_quantity: u64, free_units: u64) -> Self {
        Self {
            tier,
            min_quantity,
            free_units,
        }
    }
}

/// Tier table and shipping configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRules {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierRule>,

    /// Shipping fee (minor units) for non-empty carts without a promotion
    #[serde(default = "default_flat_shipping_fee")]
    pub flat_shipping_fee: u64,
}

fn default_tiers() -> Vec<TierRule> {
    vec![
        TierRule::new(PromotionTier::Buy2Get3, 3, 1),
        TierRule::new(PromotionTier::Buy3Get5, 5, 2),
    ]
}

fn default_flat_shipping_fee() -> u64 {
    DEFAULT_FLAT_SHIPPING_FEE
}

impl Default for PromotionRules {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            flat_shipping_fee: DEFAULT_FLAT_SHIPPING_FEE,
        }
    }
}

impl PromotionRules {
    /// Builder: set the flat shipping fee
    pub fn with_flat_shipping_fee(mut self, fee: u64) -> Self {
        self.flat_shipping_fee = fee;
        self
    }

    /// Builder: replace the tier table
    pub fn with_tiers(mut self, tiers: Vec<TierRule>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Select the tier for a total quantity.
    ///
    /// The rule with the highest `min_quantity` not above `total_quantity`
    /// wins. Returns the tier and the free units it grants, uncapped.
    pub fn tier_for(&self, total_quantity: u64) -> (PromotionTier, u64) {
        self.tiers
            .iter()
            .filter(|rule| rule.min_quantity <= total_quantity)
            .max_by_key(|rule| rule.min_quantity)
            .map(|rule| (rule.tier, rule.free_units))
            .unwrap_or((PromotionTier::None, 0))
    }

    /// Check the tier table is well formed
    pub fn validate(&self) -> ShopResult<()> {
        let mut tiers = HashSet::new();
        let mut thresholds = HashSet::new();

        for rule in &self.tiers {
            if !rule.tier.is_active() {
                return Err(ShopError::Configuration(
                    "NONE cannot appear in the tier table".to_string(),
                ));
            }
            if rule.min_quantity == 0 {
                return Err(ShopError::Configuration(format!(
                    "Tier {} must require at least one item",
                    rule.tier
                )));
            }
            if !tiers.insert(rule.tier) {
                return Err(ShopError::Configuration(format!(
                    "Tier {} is configured more than once",
                    rule.tier
                )));
            }
            if !thresholds.insert(rule.min_quantity) {
                return Err(ShopError::Configuration(format!(
                    "More than one tier starts at quantity {}",
                    rule.min_quantity
                )));
            }
        }
        Ok(())
    }

    /// Load and validate rules from a TOML string
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        let rules: PromotionRules = toml::from_str(toml_str)?;
        rules.validate()?;
        Ok(rules)
    }
}
