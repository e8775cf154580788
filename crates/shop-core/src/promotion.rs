//! # Promotion Engine
//!
//! Tiered "buy more, pay less" pricing. Given the lines of a cart, the engine
//! picks a tier from the total quantity, waives the globally cheapest units
//! and works out shipping.
//!
//! ```text
//!  total quantity ──► tier table ──► cap (MAX_FREE_UNITS) ──► free units
//!                                                                  │
//!  lines ──► stable sort by unit price ──► take cheapest ◄─────────┘
//!                                              │
//!                                              ▼
//!                         per line: free_qty + pay_qty == quantity
//! ```
//!
//! The engine is a pure function of its input and the rules it was built
//! with. It never fails: amounts on [`CartLine`] are already coerced to
//! non-negative integers, and an empty cart prices to zero.

use crate::cart::CartLine;
use crate::rules::{PromotionRules, PromotionTier, MAX_FREE_UNITS};
use serde::Serialize;
use tracing::debug;

/// A cart line with its paid/free split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    #[serde(flatten)]
    pub line: CartLine,
    /// Units charged at the unit price
    pub pay_qty: u64,
    /// Units waived by the promotion
    pub free_qty: u64,
}

impl PricedLine {
    /// Amount charged for this line
    pub fn payable(&self) -> u64 {
        self.line.unit_price.saturating_mul(self.pay_qty)
    }

    /// Amount waived on this line
    pub fn discount(&self) -> u64 {
        self.line.unit_price.saturating_mul(self.free_qty)
    }
}

/// Outcome of pricing a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionResult {
    pub tier: PromotionTier,
    /// Sum of `free_qty` over all lines
    pub free_items_applied: u64,
    /// Shipping fee in minor units
    pub shipping_fee: u64,
    /// Input lines, in input order
    pub lines: Vec<PricedLine>,
}

impl PromotionResult {
    /// Total units across all lines
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.line.quantity))
    }

    /// Price of every unit before the promotion
    pub fn subtotal(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.line.line_total()))
    }

    /// Value of the waived units
    pub fn discount(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.discount()))
    }

    /// Subtotal after the promotion, before shipping
    pub fn payable_subtotal(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.payable()))
    }

    /// Amount due including shipping
    pub fn total(&self) -> u64 {
        self.payable_subtotal().saturating_add(self.shipping_fee)
    }

    pub fn has_free_shipping(&self) -> bool {
        self.shipping_fee == 0
    }
}

/// The tiered cheapest-unit-free promotion
#[derive(Debug, Clone, Default)]
pub struct TieredPromotion {
    rules: PromotionRules,
}

impl TieredPromotion {
    pub fn new(rules: PromotionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PromotionRules {
        &self.rules
    }

    /// Price a cart.
    pub fn apply(&self, lines: &[CartLine]) -> PromotionResult {
        let total_quantity = lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.quantity));

        let (tier, granted) = self.rules.tier_for(total_quantity);
        let free_to_apply = granted.min(MAX_FREE_UNITS).min(total_quantity);

        let free_per_line = allocate_cheapest(lines, free_to_apply);

        let priced: Vec<PricedLine> = lines
            .iter()
            .zip(free_per_line)
            .map(|(line, allocated)| {
                let free_qty = allocated.min(line.quantity);
                PricedLine {
                    line: line.clone(),
                    pay_qty: line.quantity - free_qty,
                    free_qty,
                }
            })
            .collect();

        let free_items_applied: u64 = priced.iter().map(|l| l.free_qty).sum();

        let shipping_fee = match tier {
            PromotionTier::None if total_quantity > 0 => self.rules.flat_shipping_fee,
            _ => 0,
        };

        debug!(
            lines = lines.len(),
            total_quantity,
            tier = %tier,
            free_items_applied,
            shipping_fee,
            "priced cart"
        );

        PromotionResult {
            tier,
            free_items_applied,
            shipping_fee,
            lines: priced,
        }
    }
}

/// Mark the `count` cheapest units free and return the free count per line.
///
/// Units are ordered by unit price; equal prices keep line order, then
/// position within the line. Walking lines in stable price order selects
/// the same units as expanding every line into single units and sorting
/// them, without allocating one entry per unit.
fn allocate_cheapest(lines: &[CartLine], count: u64) -> Vec<u64> {
    let mut free = vec![0u64; lines.len()];
    if count == 0 {
        return free;
    }

    let mut order: Vec<(usize, u64, u64)> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| (index, line.unit_price, line.quantity))
        .collect();
    // sort_by_key is stable
    order.sort_by_key(|&(_, unit_price, _)| unit_price);

    let mut remaining = count;
    for (index, _, quantity) in order {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(quantity);
        if let Some(slot) = free.get_mut(index) {
            *slot = take;
        }
        remaining -= take;
    }
    free
}

/// Price `lines` with the default rules
pub fn apply_promotion(lines: &[CartLine]) -> PromotionResult {
    TieredPromotion::default().apply(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::TierRule;

    fn line(id: &str, unit_price: i64, quantity: i64) -> CartLine {
        CartLine::new(id, id.to_uppercase(), unit_price, quantity)
    }

    fn split(result: &PromotionResult) -> Vec<(u64, u64)> {
        result.lines.iter().map(|l| (l.pay_qty, l.free_qty)).collect()
    }

    #[test]
    fn test_single_unit_pays_flat_shipping() {
        let result = apply_promotion(&[line("a", 10, 1)]);

        assert_eq!(result.tier, PromotionTier::None);
        assert_eq!(result.free_items_applied, 0);
        assert_eq!(result.shipping_fee, 500);
        assert_eq!(split(&result), vec![(1, 0)]);
        assert_eq!(result.total(), 510);
    }

    #[test]
    fn test_three_units_waive_cheapest() {
        let result = apply_promotion(&[line("a", 10, 2), line("b", 20, 1)]);

        assert_eq!(result.tier, PromotionTier::Buy2Get3);
        assert_eq!(result.free_items_applied, 1);
        assert_eq!(result.shipping_fee, 0);
        assert_eq!(split(&result), vec![(1, 1), (1, 0)]);
        assert_eq!(result.subtotal(), 40);
        assert_eq!(result.discount(), 10);
        assert_eq!(result.total(), 30);
    }

    #[test]
    fn test_five_units_on_one_line() {
        let result = apply_promotion(&[line("a", 10, 5)]);

        assert_eq!(result.tier, PromotionTier::Buy3Get5);
        assert_eq!(result.free_items_applied, 2);
        assert_eq!(result.shipping_fee, 0);
        assert_eq!(split(&result), vec![(3, 2)]);
    }

    #[test]
    fn test_free_units_come_from_cheapest_line_anywhere_in_cart() {
        let result = apply_promotion(&[line("a", 5, 1), line("b", 10, 1), line("c", 1, 3)]);

        assert_eq!(result.tier, PromotionTier::Buy3Get5);
        assert_eq!(split(&result), vec![(1, 0), (1, 0), (1, 2)]);
        assert_eq!(result.discount(), 2);
        assert_eq!(result.payable_subtotal(), 16);
    }

    #[test]
    fn test_empty_cart() {
        let result = apply_promotion(&[]);

        assert_eq!(result.tier, PromotionTier::None);
        assert_eq!(result.free_items_applied, 0);
        assert_eq!(result.shipping_fee, 0);
        assert!(result.lines.is_empty());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_zero_quantity_lines_are_kept_but_never_free() {
        let result = apply_promotion(&[line("ghost", 0, 0), line("a", 10, 3)]);

        assert_eq!(result.tier, PromotionTier::Buy2Get3);
        assert_eq!(split(&result), vec![(0, 0), (2, 1)]);

        let only_ghosts = apply_promotion(&[line("x", 100, 0), line("y", -5, -5)]);
        assert_eq!(only_ghosts.tier, PromotionTier::None);
        assert_eq!(only_ghosts.shipping_fee, 0);
    }

    #[test]
    fn test_ties_resolved_by_input_order() {
        let result = apply_promotion(&[line("a", 10, 1), line("b", 10, 1), line("c", 10, 1)]);
        assert_eq!(split(&result), vec![(0, 1), (1, 0), (1, 0)]);

        let result = apply_promotion(&[
            line("a", 20, 2),
            line("b", 10, 1),
            line("c", 10, 2),
        ]);
        assert_eq!(split(&result), vec![(2, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_free_units_split_across_lines() {
        let result = apply_promotion(&[line("a", 50, 4), line("b", 3, 1)]);

        assert_eq!(result.tier, PromotionTier::Buy3Get5);
        assert_eq!(split(&result), vec![(3, 1), (0, 1)]);
        assert_eq!(result.discount(), 53);
    }

    #[test]
    fn test_hard_cap_holds_for_huge_carts() {
        let result = apply_promotion(&[
            line("a", 100, i64::MAX),
            line("b", 1, i64::MAX),
            line("c", 0, 1_000_000),
        ]);

        assert_eq!(result.free_items_applied, 2);
        assert_eq!(split(&result)[2], (999_998, 2));
        assert_eq!(result.shipping_fee, 0);
    }

    #[test]
    fn test_cap_applies_to_generous_tier_tables() {
        let rules = PromotionRules::default().with_tiers(vec![
            TierRule::new(PromotionTier::Buy2Get3, 3, 1),
            TierRule::new(PromotionTier::Buy3Get5, 5, 10),
        ]);
        let engine = TieredPromotion::new(rules);

        let result = engine.apply(&[line("a", 10, 20)]);
        assert_eq!(result.tier, PromotionTier::Buy3Get5);
        assert_eq!(result.free_items_applied, MAX_FREE_UNITS);
        assert_eq!(split(&result), vec![(18, 2)]);
    }

    #[test]
    fn test_custom_flat_shipping_fee() {
        let engine = TieredPromotion::new(PromotionRules::default().with_flat_shipping_fee(799));

        assert_eq!(engine.apply(&[line("a", 10, 2)]).shipping_fee, 799);
        assert_eq!(engine.apply(&[line("a", 10, 3)]).shipping_fee, 0);
        assert_eq!(engine.apply(&[]).shipping_fee, 0);
    }

    #[test]
    fn test_repeated_calls_give_identical_results() {
        let lines = vec![line("a", 7, 2), line("b", 3, 2), line("c", 7, 1)];
        let engine = TieredPromotion::default();
        assert_eq!(engine.apply(&lines), engine.apply(&lines));
    }

    #[test]
    fn test_properties_over_small_carts() {
        const PRICES: [i64; 4] = [0, 1, 5, 10];
        let engine = TieredPromotion::default();

        for p0 in PRICES {
            for p1 in PRICES {
                for p2 in PRICES {
                    for q0 in 0..=4 {
                        for q1 in 0..=4 {
                            for q2 in 0..=4 {
                                let lines = vec![
                                    line("a", p0, q0),
                                    line("b", p1, q1),
                                    line("c", p2, q2),
                                ];
                                check_properties(&engine.apply(&lines));
                            }
                        }
                    }
                }
            }
        }
    }

    fn check_properties(result: &PromotionResult) {
        let q = result.total_quantity();

        for l in &result.lines {
            assert_eq!(l.pay_qty + l.free_qty, l.line.quantity, "{result:?}");
        }

        let free: u64 = result.lines.iter().map(|l| l.free_qty).sum();
        assert_eq!(free, result.free_items_applied);
        assert!(free <= MAX_FREE_UNITS);

        match q {
            0 => assert_eq!((free, result.shipping_fee), (0, 0)),
            1..=2 => assert_eq!((free, result.shipping_fee), (0, 500)),
            3..=4 => assert_eq!((free, result.shipping_fee), (1, 0)),
            _ => assert_eq!((free, result.shipping_fee), (2, 0)),
        }

        // No paid unit is cheaper than a free unit; equal prices favour earlier lines.
        for (i, a) in result.lines.iter().enumerate() {
            for (j, b) in result.lines.iter().enumerate() {
                if a.free_qty > 0 && b.pay_qty > 0 {
                    assert!(a.line.unit_price <= b.line.unit_price, "{result:?}");
                    if a.line.unit_price == b.line.unit_price {
                        assert!(i <= j, "{result:?}");
                    }
                }
            }
        }

        assert_eq!(
            result.payable_subtotal() + result.discount(),
            result.subtotal()
        );
    }

    #[test]
    fn test_result_serializes_flat_lines() {
        let result = apply_promotion(&[line("a", 10, 3).with_image("/img/a.webp")]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["tier"], "BUY_2_GET_3");
        assert_eq!(json["free_items_applied"], 1);
        assert_eq!(json["lines"][0]["id"], "a");
        assert_eq!(json["lines"][0]["image_url"], "/img/a.webp");
        assert_eq!(json["lines"][0]["pay_qty"], 2);
        assert_eq!(json["lines"][0]["free_qty"], 1);
    }
}
