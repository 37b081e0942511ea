//! Wishlist Aggregate

use crate::domain::aggregates::Product;
use crate::domain::events::WishlistEvent;
use crate::domain::value_objects::ItemId;

#[derive(Clone, Debug, Default)]
pub struct Wishlist {
    items: Vec<Product>,
}

impl Wishlist {
    pub fn items(&self) -> &[Product] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn contains(&self, id: &ItemId) -> bool { self.items.iter().any(|p| p.id() == id) }

    /// Removes the product when present, adds it otherwise.
    pub fn toggle(&mut self, product: &Product) -> WishlistEvent {
        let product_id = product.id().clone();
        if self.contains(&product_id) {
            self.items.retain(|p| p.id() != &product_id);
            WishlistEvent::Removed { product_id }
        } else {
            self.items.push(product.clone());
            WishlistEvent::Added { product_id }
        }
    }

    pub fn replace(&mut self, items: Vec<Product>) {
        self.items.clear();
        for product in items {
            if !self.contains(product.id()) { self.items.push(product); }
        }
    }

    pub fn clear(&mut self) { self.items.clear(); }
}
