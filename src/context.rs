//! Application cart context
//!
//! One [`CartContext`] per running storefront session. It owns the cart, the
//! wishlist, the session identity and the persistence adapter; callers hold
//! it and pass it by reference.

use serde::Serialize;

use crate::config::StorefrontConfig;
use crate::domain::aggregates::{Cart, LineItem, OrderConfirmation, Product, Wishlist};
use crate::domain::events::{CartEvent, WishlistEvent};
use crate::domain::pricing::CartSnapshot;
use crate::domain::value_objects::ItemId;
use crate::persistence::{PersistenceAdapter, SyncOutcome, SyncSource, UserProfile};
use crate::CartError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { user: UserProfile, token: String },
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self { Self::Authenticated { token, .. } => Some(token), Self::Anonymous => None }
    }
    pub fn user(&self) -> Option<&UserProfile> {
        match self { Self::Authenticated { user, .. } => Some(user), Self::Anonymous => None }
    }
    pub fn is_authenticated(&self) -> bool { matches!(self, Self::Authenticated { .. }) }
}

/// Non-blocking message for the presentation layer (toast).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Notice {
    Info(String),
    Warning(String),
}

#[derive(Debug)]
pub struct CartContext {
    cart: Cart,
    wishlist: Wishlist,
    session: Session,
    adapter: PersistenceAdapter,
    require_auth_for_add: bool,
    notices: Vec<Notice>,
}

impl CartContext {
    pub fn new(config: &StorefrontConfig, adapter: PersistenceAdapter) -> Self {
        Self {
            cart: Cart::new(&config.currency),
            wishlist: Wishlist::default(),
            session: Session::Anonymous,
            adapter,
            require_auth_for_add: config.require_auth_for_add,
            notices: vec![],
        }
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn items(&self) -> &[LineItem] { self.cart.items() }
    pub fn snapshot(&self) -> CartSnapshot { self.cart.snapshot() }
    pub fn wishlist(&self) -> &Wishlist { &self.wishlist }
    pub fn session(&self) -> &Session { &self.session }
    pub fn adapter(&self) -> &PersistenceAdapter { &self.adapter }
    pub fn sync_source(&self) -> SyncSource { self.adapter.last_sync() }
    pub fn drain_notices(&mut self) -> Vec<Notice> { std::mem::take(&mut self.notices) }

    /// Startup: restore and verify the stored session, then load the cart.
    ///
    /// A rejected token clears the stored identity but never the cart, which
    /// then loads from local storage.
    pub async fn init(&mut self) {
        let Some(token) = self.adapter.stored_token() else {
            let outcome = self.adapter.load_local();
            self.apply(outcome);
            return;
        };
        match self.adapter.remote().verify_session(&token).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.session = Session::Authenticated { user, token: token.clone() };
                let outcome = self.adapter.load(Some(&token)).await;
                self.apply(outcome);
                self.refresh_wishlist().await;
            }
            Err(error) if error.is_auth_failure() => {
                tracing::warn!(%error, "stored session rejected, continuing anonymously");
                self.adapter.clear_identity();
                self.notices.push(Notice::Info("Your session has expired. Please sign in again.".to_string()));
                let outcome = self.adapter.load_local();
                self.apply(outcome);
            }
            Err(error) => {
                tracing::warn!(%error, "could not verify stored session, continuing anonymously");
                self.notices.push(Notice::Warning("Could not reach the store. Showing the cart saved on this device.".to_string()));
                let outcome = self.adapter.load_local();
                self.apply(outcome);
            }
        }
    }

    /// Signs in with `token`, merges the anonymous cart into the account and
    /// reloads the account cart.
    pub async fn login(&mut self, token: impl Into<String>) -> Result<(), CartError> {
        let token = token.into();
        let user = self.adapter.remote().verify_session(&token).await.map_err(CartError::AuthFailed)?;
        tracing::info!(user_id = %user.id, "signed in");
        self.adapter.store_identity(&token, &user);
        let anonymous = if self.session.is_authenticated() { vec![] } else { self.cart.items().to_vec() };
        let outcome = self.adapter.merge_and_reload(&token, &anonymous).await;
        self.session = Session::Authenticated { user, token };
        self.apply(outcome);
        self.refresh_wishlist().await;
        Ok(())
    }

    /// Signs out and empties the in-memory cart. With `preserve_cart` the
    /// local copy is left on disk; otherwise it is cleared too.
    pub fn logout(&mut self, preserve_cart: bool) {
        self.session = Session::Anonymous;
        self.adapter.clear_identity();
        self.wishlist.clear();
        self.cart.replace_items(vec![]);
        if !preserve_cart {
            self.adapter.clear_local();
        }
        tracing::info!(preserve_cart, "signed out");
    }

    pub async fn add(&mut self, item: LineItem) -> Result<(), CartError> {
        if self.require_auth_for_add && !self.session.is_authenticated() {
            return Err(CartError::AuthRequired);
        }
        let event = self.cart.add(item);
        self.persist(event).await;
        Ok(())
    }

    pub async fn add_product(&mut self, product: &Product) -> Result<(), CartError> {
        let item = product.to_line_item()?;
        self.add(item).await?;
        self.notices.push(Notice::Info(format!("{} added to cart", product.name())));
        Ok(())
    }

    pub async fn increment(&mut self, id: &ItemId) {
        if let Some(event) = self.cart.increment(id) { self.persist(event).await; }
    }

    pub async fn decrement(&mut self, id: &ItemId) {
        if let Some(event) = self.cart.decrement(id) { self.persist(event).await; }
    }

    pub async fn remove(&mut self, id: &ItemId) {
        if let Some(event) = self.cart.remove(id) { self.persist(event).await; }
    }

    pub async fn clear(&mut self) {
        if let Some(event) = self.cart.clear() { self.persist(event).await; }
    }

    /// Freezes the cart into a confirmation and clears it.
    pub async fn checkout_success(&mut self, order_number: impl Into<String>) -> Result<OrderConfirmation, CartError> {
        let confirmation = OrderConfirmation::create(order_number, self.cart.items().to_vec(), self.cart.snapshot())?;
        self.clear().await;
        tracing::info!(order_number = confirmation.order_number(), total = %confirmation.total(), "order confirmed");
        self.notices.push(Notice::Info(format!("Order {} confirmed", confirmation.order_number())));
        Ok(confirmation)
    }

    /// Adds or removes `product` from the wishlist. Returns whether it is now
    /// on the list.
    pub async fn toggle_wishlist(&mut self, product: &Product) -> Result<bool, CartError> {
        let Some(token) = self.session.token().map(str::to_owned) else {
            return Err(CartError::AuthRequired);
        };
        let event = self.wishlist.toggle(product);
        let result = match &event {
            WishlistEvent::Added { product_id } => self.adapter.remote().add_to_wishlist(&token, product_id).await,
            WishlistEvent::Removed { product_id } => self.adapter.remote().remove_from_wishlist(&token, product_id).await,
        };
        match result {
            Ok(items) => self.wishlist.replace(items),
            Err(error) => {
                tracing::warn!(%error, product_id = %event.product_id(), "wishlist sync failed");
                self.notices.push(Notice::Warning("Could not update your wishlist on the server.".to_string()));
            }
        }
        Ok(matches!(event, WishlistEvent::Added { .. }))
    }

    async fn refresh_wishlist(&mut self) {
        let Some(token) = self.session.token() else { return };
        match self.adapter.remote().fetch_wishlist(token).await {
            Ok(items) => self.wishlist.replace(items),
            Err(error) => tracing::warn!(%error, "wishlist load failed"),
        }
    }

    async fn persist(&mut self, event: CartEvent) {
        let outcome = self.adapter.write_through(&event, self.cart.items(), self.session.token()).await;
        self.apply(outcome);
    }

    fn apply(&mut self, outcome: SyncOutcome) {
        if let SyncOutcome::Fallback { error, .. } = &outcome {
            tracing::debug!(%error, "applying local fallback");
            self.notices.push(Notice::Warning("Could not sync your cart with the store. Changes are saved on this device.".to_string()));
        }
        self.cart.replace_items(outcome.into_items());
    }
}
