//! Storefront cart core
//!
//! Client-side cart for the storefront: bulk-discount pricing, cart
//! mutations, and persistence that reconciles a local durable cache with the
//! remote cart API.
//!
//! ## Features
//! - Line-item cart with add / increment / decrement / remove / clear
//! - Pricing snapshot: subtotal, markdown savings, bulk-quantity discount
//! - Local cache with a 7-day timestamped backup
//! - Remote write-through with local fallback and login-time merge
//! - Wishlist and order confirmation

use thiserror::Error;

pub mod config;
pub mod context;
pub mod domain;
pub mod persistence;

pub use config::{ConfigError, StorefrontConfig};
pub use context::{CartContext, Notice, Session};
pub use domain::aggregates::{Cart, LineItem, OrderConfirmation, Product, Wishlist};
pub use domain::pricing::{compute_snapshot, BulkTier, CartSnapshot};
pub use domain::value_objects::{ItemId, Money, Quantity};
pub use persistence::{PersistenceAdapter, RemoteError, StorageError, SyncSource};

use domain::aggregates::{OrderError, ProductError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CartError {
    /// The action needs a signed-in user; the shell shows a login prompt.
    #[error("Please sign in to continue")]
    AuthRequired,

    #[error("Session verification failed: {0}")]
    AuthFailed(#[source] RemoteError),

    #[error("Product is out of stock")]
    OutOfStock,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ProductError> for CartError {
    fn from(err: ProductError) -> Self {
        match err { ProductError::OutOfStock => Self::OutOfStock }
    }
}

impl From<OrderError> for CartError {
    fn from(err: OrderError) -> Self {
        match err { OrderError::NoItems => Self::EmptyCart }
    }
}

pub type Result<T> = std::result::Result<T, CartError>;
