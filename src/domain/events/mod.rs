//! Domain events
//!
//! Every cart mutation that changes state yields exactly one [`CartEvent`].
//! The persistence adapter replays these against the remote cart API.
use crate::domain::aggregates::LineItem;
use crate::domain::value_objects::ItemId;

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    /// `item` is the line as it stands after the add (quantity included).
    ItemAdded { item: LineItem },
    QuantityChanged { item_id: ItemId, quantity: u32 },
    ItemRemoved { item_id: ItemId },
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WishlistEvent {
    Added { product_id: ItemId },
    Removed { product_id: ItemId },
}

impl WishlistEvent {
    pub fn product_id(&self) -> &ItemId {
        match self { Self::Added { product_id } | Self::Removed { product_id } => product_id }
    }
}
