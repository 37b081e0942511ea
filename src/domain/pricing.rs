//! Cart pricing
//!
//! Pure derivation of a [`CartSnapshot`] from a line-item list: subtotal,
//! per-item markdown savings and the cart-wide bulk discount.

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::LineItem;
use crate::domain::value_objects::Money;

/// Cart-wide per-unit discount keyed to the total quantity in the cart.
///
/// Lower bounds are inclusive: exactly 10 units already earns `Ten`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BulkTier {
    #[default]
    Base,
    Ten,
    Twenty,
    Thirty,
}

impl BulkTier {
    pub fn for_quantity(total_quantity: u32) -> Self {
        match total_quantity {
            0..=9 => Self::Base,
            10..=19 => Self::Ten,
            20..=29 => Self::Twenty,
            _ => Self::Thirty,
        }
    }

    pub fn min_quantity(&self) -> u32 {
        match self { Self::Base => 0, Self::Ten => 10, Self::Twenty => 20, Self::Thirty => 30 }
    }

    /// Discount per unit, in whole currency units.
    pub fn per_unit_discount(&self) -> Decimal {
        match self {
            Self::Base => Decimal::ZERO,
            Self::Ten => Decimal::from(10),
            Self::Twenty => Decimal::from(15),
            Self::Thirty => Decimal::from(20),
        }
    }

    fn next(&self) -> Option<Self> {
        match self { Self::Base => Some(Self::Ten), Self::Ten => Some(Self::Twenty), Self::Twenty => Some(Self::Thirty), Self::Thirty => None }
    }

    /// Units still needed to reach the next tier, with that tier's per-unit discount.
    ///
    /// `None` for an empty cart (no tier messaging) and at the top tier.
    pub fn next_tier(total_quantity: u32) -> Option<(u32, Decimal)> {
        if total_quantity == 0 { return None; }
        let next = Self::for_quantity(total_quantity).next()?;
        Some((next.min_quantity() - total_quantity, next.per_unit_discount()))
    }
}

/// Derived totals of a cart; never stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub subtotal: Money,
    pub total_quantity: u32,
    pub product_discount_total: Money,
    pub bulk_tier: BulkTier,
    pub per_unit_bulk_discount: Money,
    pub bulk_discount_total: Money,
    pub total_savings: Money,
    pub final_total: Money,
}

impl CartSnapshot {
    pub fn empty(currency: &str) -> Self { compute_snapshot(&[], currency) }
    pub fn has_savings(&self) -> bool { !self.total_savings.is_zero() }

    /// Units to add for the next bulk tier and the per-unit discount it unlocks.
    pub fn next_tier(&self) -> Option<(u32, Money)> {
        let (units, per_unit) = BulkTier::next_tier(self.total_quantity)?;
        Some((units, Money::new(per_unit, self.subtotal.currency())))
    }
}

/// Computes the snapshot for `items`. Pure: the same list always yields the
/// same snapshot.
///
/// A line whose totals overflow `Decimal` is left out of every figure.
pub fn compute_snapshot(items: &[LineItem], currency: &str) -> CartSnapshot {
    let mut subtotal = Decimal::ZERO;
    let mut product_discount_total = Decimal::ZERO;
    let mut total_quantity = 0u32;
    for item in items {
        let sums = item.line_total().zip(item.markdown_total()).and_then(|(line, markdown)| {
            Some((subtotal.checked_add(line)?, product_discount_total.checked_add(markdown)?))
        });
        let Some((next_subtotal, next_discount)) = sums else {
            tracing::warn!(item_id = %item.id, price = %item.price, "line total overflows, left out of pricing");
            continue;
        };
        subtotal = next_subtotal;
        product_discount_total = next_discount;
        total_quantity = total_quantity.saturating_add(item.quantity.value());
    }

    let bulk_tier = BulkTier::for_quantity(total_quantity);
    let per_unit = bulk_tier.per_unit_discount();
    let bulk_discount_total = per_unit * Decimal::from(total_quantity);

    let total_savings = product_discount_total.saturating_add(bulk_discount_total);
    let final_total = subtotal.saturating_sub(total_savings).max(Decimal::ZERO);

    CartSnapshot {
        subtotal: Money::new(subtotal, currency),
        total_quantity,
        product_discount_total: Money::new(product_discount_total, currency),
        bulk_tier,
        per_unit_bulk_discount: Money::new(per_unit, currency),
        bulk_discount_total: Money::new(bulk_discount_total, currency),
        total_savings: Money::new(total_savings, currency),
        final_total: Money::new(final_total, currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ItemId;

    fn item(id: &str, price: i64, quantity: u32) -> LineItem {
        LineItem::new(ItemId::from(id), id, Decimal::new(price, 0)).with_quantity(quantity)
    }

    fn dec(v: i64) -> Decimal { Decimal::new(v, 0) }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let s = compute_snapshot(&[], "INR");
        assert_eq!(s.total_quantity, 0);
        assert!(s.subtotal.is_zero() && s.total_savings.is_zero() && s.final_total.is_zero());
        assert_eq!(s.bulk_tier, BulkTier::Base);
        assert!(BulkTier::next_tier(0).is_none());
    }

    #[test]
    fn test_worked_example() {
        let items = vec![item("a", 100, 5), item("b", 50, 6).with_original_price(dec(80))];
        let s = compute_snapshot(&items, "INR");
        assert_eq!(s.subtotal.amount(), dec(800));
        assert_eq!(s.total_quantity, 11);
        assert_eq!(s.per_unit_bulk_discount.amount(), dec(10));
        assert_eq!(s.bulk_discount_total.amount(), dec(110));
        assert_eq!(s.product_discount_total.amount(), dec(180));
        assert_eq!(s.total_savings.amount(), dec(290));
        assert_eq!(s.final_total.amount(), dec(510));
    }

    #[test]
    fn test_tier_boundaries() {
        for (quantity, per_unit) in [(9, 0), (10, 10), (19, 10), (20, 15), (29, 15), (30, 20), (200, 20)] {
            assert_eq!(BulkTier::for_quantity(quantity).per_unit_discount(), dec(per_unit), "quantity {quantity}");
        }
    }

    #[test]
    fn test_final_total_never_negative() {
        let items = vec![item("cheap", 1, 30), item("marked", 5, 1).with_original_price(dec(500))];
        let s = compute_snapshot(&items, "INR");
        assert!(s.total_savings.amount() > s.subtotal.amount());
        assert_eq!(s.final_total.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_original_below_price_gives_no_markdown() {
        let s = compute_snapshot(&[item("a", 100, 2).with_original_price(dec(90))], "INR");
        assert!(s.product_discount_total.is_zero());
        assert!(!s.has_savings());
    }

    #[test]
    fn test_idempotent() {
        let items = vec![item("a", 120, 12), item("b", 45, 3).with_original_price(dec(60))];
        assert_eq!(compute_snapshot(&items, "INR"), compute_snapshot(&items, "INR"));
    }

    #[test]
    fn test_next_tier_messaging() {
        assert_eq!(BulkTier::next_tier(7), Some((3, dec(10))));
        assert_eq!(BulkTier::next_tier(10), Some((10, dec(15))));
        assert_eq!(BulkTier::next_tier(25), Some((5, dec(20))));
        assert_eq!(BulkTier::next_tier(30), None);
        let s = compute_snapshot(&[item("a", 10, 18)], "INR");
        assert_eq!(s.next_tier(), Some((2, Money::inr(dec(15)))));
    }

    #[test]
    fn test_overflowing_line_left_out() {
        let huge = LineItem::new(ItemId::from("huge"), "huge", Decimal::MAX).with_quantity(10);
        let s = compute_snapshot(&[item("a", 100, 2), huge], "INR");
        assert_eq!(s.subtotal.amount(), dec(200));
        assert_eq!(s.total_quantity, 2);
        assert_eq!(s.final_total.amount(), dec(200));
    }
}
