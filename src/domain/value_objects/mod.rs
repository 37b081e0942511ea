//! Value Objects for the storefront cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default storefront currency (prices are decimal rupees).
pub const DEFAULT_CURRENCY: &str = "INR";

/// Canonical identifier of a product / line item.
///
/// Inbound payloads carry the id under several field names; it is resolved
/// once at the ingestion boundary and only this type is used afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() { None } else { Some(Self(value)) }
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self { Self(value.trim().to_string()) }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn inr(amount: Decimal) -> Self { Self::new(amount, DEFAULT_CURRENCY) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// Quantity value object
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    pub fn subtract(&self, other: u32) -> Option<Self> {
        if other > self.0 { None } else { Some(Self(self.0 - other)) }
    }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

impl Default for Quantity { fn default() -> Self { Self(0) } }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_rejects_blank() {
        assert!(ItemId::new("   ").is_none());
        assert_eq!(ItemId::new(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::inr(Decimal::new(510, 0)).to_string(), "INR 510.00");
    }

    #[test]
    fn test_quantity_subtract() {
        assert_eq!(Quantity::ONE.subtract(1), Some(Quantity::new(0)));
        assert!(Quantity::ONE.subtract(2).is_none());
        assert!(Quantity::new(0).is_zero());
    }
}
