//! Line Item

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::value_objects::{ItemId, Quantity};

/// One product entry in the cart.
///
/// Serializes in the storefront's local-storage shape (`id`, `price`,
/// `originalPrice`, ...). Inbound data never deserializes into this type
/// directly; it goes through [`crate::persistence::wire::normalize_item`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl LineItem {
    pub fn new(id: ItemId, name: impl Into<String>, price: Decimal) -> Self {
        Self { id, name: name.into(), price, original_price: None, quantity: Quantity::ONE, image: None, images: vec![] }
    }

    pub fn with_original_price(mut self, original: Decimal) -> Self { self.original_price = Some(original); self }
    pub fn with_quantity(mut self, quantity: u32) -> Self { self.quantity = Quantity::new(quantity); self }
    pub fn with_image(mut self, image: impl Into<String>) -> Self { self.image = Some(image.into()); self }

    /// `price * quantity`, or `None` if it overflows `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> { self.price.checked_mul(Decimal::from(self.quantity.value())) }

    /// Per-unit markdown from `original_price` to `price`; zero when the
    /// original is missing or not above the listed price.
    pub fn unit_markdown(&self) -> Decimal {
        match self.original_price {
            Some(original) if original > self.price => original.checked_sub(self.price).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    pub fn markdown_total(&self) -> Option<Decimal> { self.unit_markdown().checked_mul(Decimal::from(self.quantity.value())) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64) -> LineItem { LineItem::new(ItemId::from("a"), "Classic Filter", Decimal::new(price, 0)) }

    #[test]
    fn test_markdown_only_when_original_above_price() {
        assert_eq!(item(50).with_original_price(Decimal::new(80, 0)).unit_markdown(), Decimal::new(30, 0));
        assert_eq!(item(50).with_original_price(Decimal::new(40, 0)).unit_markdown(), Decimal::ZERO);
        assert_eq!(item(50).unit_markdown(), Decimal::ZERO);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(100).with_quantity(5).line_total(), Some(Decimal::new(500, 0)));
    }

    #[test]
    fn test_serializes_local_storage_shape() {
        let json = serde_json::to_value(item(50).with_original_price(Decimal::new(80, 0))).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["price"], 50.0);
        assert_eq!(json["originalPrice"], 80.0);
        assert_eq!(json["quantity"], 1);
        assert!(json.get("image").is_none());
    }
}
