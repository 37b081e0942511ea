//! Product Aggregate

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use crate::domain::aggregates::LineItem;
use crate::domain::value_objects::{ItemId, Money, Quantity};

/// Catalog entry as shown on product and wishlist pages.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ItemId,
    name: String,
    price: Money,
    original_price: Option<Money>,
    images: Vec<String>,
    /// `None` when the backend does not track stock for the product.
    stock: Option<Quantity>,
}

impl Product {
    pub fn new(id: ItemId, name: impl Into<String>, price: Money) -> Self {
        Self { id, name: name.into(), price, original_price: None, images: vec![], stock: None }
    }

    pub fn with_original_price(mut self, original: Money) -> Self { self.original_price = Some(original); self }
    pub fn with_images(mut self, images: Vec<String>) -> Self { self.images = images; self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = Some(Quantity::new(stock)); self }

    pub fn id(&self) -> &ItemId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> &Money { &self.price }
    pub fn original_price(&self) -> Option<&Money> { self.original_price.as_ref() }
    pub fn images(&self) -> &[String] { &self.images }
    pub fn is_in_stock(&self) -> bool { self.stock.map_or(true, |q| !q.is_zero()) }

    /// Markdown as a whole percentage of the original price, e.g. "save 38%".
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price.as_ref()?.amount();
        let price = self.price.amount();
        if original <= price || original.is_zero() { return None; }
        ((original - price) / original * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }

    /// One unit of this product as a cart line.
    pub fn to_line_item(&self) -> Result<LineItem, ProductError> {
        if !self.is_in_stock() { return Err(ProductError::OutOfStock); }
        let mut item = LineItem::new(self.id.clone(), self.name.clone(), self.price.amount());
        item.original_price = self.original_price.as_ref().map(Money::amount);
        item.image = self.images.first().cloned();
        item.images = self.images.clone();
        Ok(item)
    }
}

#[derive(Debug, Clone)] pub enum ProductError { OutOfStock }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::OutOfStock => write!(f, "Product is out of stock") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64) -> Product { Product::new(ItemId::from("P1"), "Gold Flake Kings", Money::inr(Decimal::new(price, 0))) }

    #[test]
    fn test_discount_percent() {
        let p = product(50).with_original_price(Money::inr(Decimal::new(80, 0)));
        assert_eq!(p.discount_percent(), Some(38));
        assert_eq!(product(50).discount_percent(), None);
        assert_eq!(product(90).with_original_price(Money::inr(Decimal::new(80, 0))).discount_percent(), None);
    }

    #[test]
    fn test_to_line_item() {
        let p = product(50).with_original_price(Money::inr(Decimal::new(80, 0))).with_images(vec!["front.jpg".into(), "back.jpg".into()]);
        let item = p.to_line_item().unwrap();
        assert_eq!(item.id.as_str(), "P1");
        assert_eq!(item.quantity.value(), 1);
        assert_eq!(item.original_price, Some(Decimal::new(80, 0)));
        assert_eq!(item.image.as_deref(), Some("front.jpg"));
    }

    #[test]
    fn test_out_of_stock_cannot_become_line_item() {
        assert!(product(50).with_stock(0).to_line_item().is_err());
        assert!(product(50).with_stock(3).to_line_item().is_ok());
    }
}
