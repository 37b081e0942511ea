//! Cart Aggregate

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::aggregates::LineItem;
use crate::domain::events::CartEvent;
use crate::domain::pricing::{self, CartSnapshot};
use crate::domain::value_objects::{ItemId, Quantity};

/// The authoritative line-item list of one session context.
///
/// Mutations return the [`CartEvent`] they produced, or `None` when they were
/// a no-op (unknown id, clearing an empty cart). Quantities are never zero
/// for an item present in the list.
#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    currency: String,
    items: Vec<LineItem>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { id: Uuid::new_v4().to_string(), currency: currency.to_string(), items: vec![], updated_at: Utc::now() }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> { self.items.iter().find(|i| &i.id == id) }
    pub fn total_quantity(&self) -> u32 { self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity.value())) }

    /// Recomputed on every call; nothing is cached.
    pub fn snapshot(&self) -> CartSnapshot { pricing::compute_snapshot(&self.items, &self.currency) }

    /// Adds one unit: bumps an existing line or appends a new one at quantity 1.
    pub fn add(&mut self, item: LineItem) -> CartEvent {
        let line = if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.add(1);
            existing.clone()
        } else {
            let line = LineItem { quantity: Quantity::ONE, ..item };
            self.items.push(line.clone());
            line
        };
        tracing::debug!(item_id = %line.id, quantity = line.quantity.value(), "cart item added");
        self.touch();
        CartEvent::ItemAdded { item: line }
    }

    pub fn increment(&mut self, id: &ItemId) -> Option<CartEvent> {
        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            tracing::warn!(item_id = %id, "increment ignored: item not in cart");
            return None;
        };
        item.quantity = item.quantity.add(1);
        let quantity = item.quantity.value();
        self.touch();
        Some(CartEvent::QuantityChanged { item_id: id.clone(), quantity })
    }

    /// Drops one unit; at zero the line is removed instead.
    pub fn decrement(&mut self, id: &ItemId) -> Option<CartEvent> {
        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            tracing::warn!(item_id = %id, "decrement ignored: item not in cart");
            return None;
        };
        match item.quantity.subtract(1) {
            Some(q) if !q.is_zero() => {
                item.quantity = q;
                self.touch();
                Some(CartEvent::QuantityChanged { item_id: id.clone(), quantity: q.value() })
            }
            _ => self.remove(id),
        }
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<CartEvent> {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        if self.items.len() == before {
            tracing::warn!(item_id = %id, "remove ignored: item not in cart");
            return None;
        }
        self.touch();
        Some(CartEvent::ItemRemoved { item_id: id.clone() })
    }

    pub fn clear(&mut self) -> Option<CartEvent> {
        if self.items.is_empty() { return None; }
        self.items.clear();
        self.touch();
        Some(CartEvent::Cleared)
    }

    /// Installs an authoritative list (remote read or local load).
    ///
    /// Duplicate ids collapse into one line with summed quantity; zero
    /// quantities are dropped.
    pub fn replace_items(&mut self, items: Vec<LineItem>) {
        let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
        for item in items.into_iter().filter(|i| !i.quantity.is_zero()) {
            match merged.iter_mut().find(|m| m.id == item.id) {
                Some(existing) => existing.quantity = existing.quantity.add(item.quantity.value()),
                None => merged.push(item),
            }
        }
        self.items = merged;
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
