//! Order Confirmation

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::aggregates::LineItem;
use crate::domain::pricing::CartSnapshot;
use crate::domain::value_objects::Money;

/// Frozen view of a cart at checkout success, shown on the confirmation page.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    order_number: String,
    items: Vec<LineItem>,
    snapshot: CartSnapshot,
    confirmed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    pub fn create(order_number: impl Into<String>, items: Vec<LineItem>, snapshot: CartSnapshot) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        Ok(Self { order_number: order_number.into(), items, snapshot, confirmed_at: Utc::now() })
    }

    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn snapshot(&self) -> &CartSnapshot { &self.snapshot }
    pub fn total(&self) -> &Money { &self.snapshot.final_total }
    pub fn savings(&self) -> &Money { &self.snapshot.total_savings }
    pub fn unit_count(&self) -> u32 { self.snapshot.total_quantity }
    pub fn confirmed_at(&self) -> DateTime<Utc> { self.confirmed_at }
}

#[derive(Debug, Clone)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NoItems => write!(f, "No items") }
    }
}
