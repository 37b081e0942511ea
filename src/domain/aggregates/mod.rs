//! Aggregates module
pub mod line_item;
pub mod cart;
pub mod product;
pub mod wishlist;
pub mod order;

pub use line_item::LineItem;
pub use cart::Cart;
pub use product::{Product, ProductError};
pub use wishlist::Wishlist;
pub use order::{OrderConfirmation, OrderError};
