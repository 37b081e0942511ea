//! Two-tier cart writer: remote cart API first when a session token is
//! present, local durable cache always.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::LineItem;
use crate::domain::events::CartEvent;
use crate::persistence::local::LocalCartCache;
use crate::persistence::remote::{RemoteCartApi, RemoteError, UserProfile};

/// Where the in-memory cart last successfully synchronized to or from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SyncSource {
    #[default]
    Never,
    Local,
    Remote,
}

/// Result of a write-through or a load.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The remote store answered; its list is authoritative.
    Remote(Vec<LineItem>),
    /// Anonymous session, local cache only.
    Local(Vec<LineItem>),
    /// The remote call failed; the local list stands and the views may diverge.
    Fallback { items: Vec<LineItem>, error: RemoteError },
}

impl SyncOutcome {
    pub fn items(&self) -> &[LineItem] {
        match self { Self::Remote(items) | Self::Local(items) | Self::Fallback { items, .. } => items }
    }

    pub fn into_items(self) -> Vec<LineItem> {
        match self { Self::Remote(items) | Self::Local(items) | Self::Fallback { items, .. } => items }
    }
}

pub struct PersistenceAdapter {
    local: LocalCartCache,
    remote: Arc<dyn RemoteCartApi>,
    last_sync: SyncSource,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter").field("local", &self.local).field("last_sync", &self.last_sync).finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(local: LocalCartCache, remote: Arc<dyn RemoteCartApi>) -> Self {
        Self { local, remote, last_sync: SyncSource::Never }
    }

    pub fn last_sync(&self) -> SyncSource { self.last_sync }
    pub fn local(&self) -> &LocalCartCache { &self.local }
    pub fn remote(&self) -> &dyn RemoteCartApi { self.remote.as_ref() }

    /// Persists the list after `event`.
    ///
    /// With a token the event is replayed remotely and, on success, the
    /// server's list replaces both the local mirror and `items`. Without a
    /// token, or when the remote call fails, `items` is written locally.
    pub async fn write_through(&mut self, event: &CartEvent, items: &[LineItem], token: Option<&str>) -> SyncOutcome {
        let Some(token) = token else {
            self.save_local(items);
            return SyncOutcome::Local(items.to_vec());
        };
        let result = match event {
            CartEvent::ItemAdded { item } => self.remote.add_item(token, item, 1).await,
            CartEvent::QuantityChanged { item_id, quantity } => self.remote.update_quantity(token, item_id, *quantity).await,
            CartEvent::ItemRemoved { item_id } => self.remote.remove_item(token, item_id).await,
            CartEvent::Cleared => self.remote.replace_cart(token, &[]).await,
        };
        match result {
            Ok(remote_items) => self.adopt_remote(remote_items),
            Err(error) => {
                tracing::warn!(%error, ?event, "remote cart write failed, keeping local copy");
                self.save_local(items);
                SyncOutcome::Fallback { items: items.to_vec(), error }
            }
        }
    }

    /// Loads the authoritative list: remote when a token is present (falling
    /// back to the local cache on failure), local otherwise.
    pub async fn load(&mut self, token: Option<&str>) -> SyncOutcome {
        let Some(token) = token else {
            return self.load_local();
        };
        match self.remote.fetch_cart(token).await {
            Ok(items) => self.adopt_remote(items),
            Err(error) => {
                tracing::warn!(%error, "remote cart load failed, using local copy");
                let items = self.local.load();
                self.last_sync = SyncSource::Local;
                SyncOutcome::Fallback { items, error }
            }
        }
    }

    pub fn load_local(&mut self) -> SyncOutcome {
        let items = self.local.load();
        self.last_sync = SyncSource::Local;
        SyncOutcome::Local(items)
    }

    /// Login hand-off: pushes the anonymous list to the merge endpoint, then
    /// reloads the account cart. If the merge fails the anonymous list is
    /// kept locally rather than overwritten by the account cart.
    pub async fn merge_and_reload(&mut self, token: &str, anonymous: &[LineItem]) -> SyncOutcome {
        if !anonymous.is_empty() {
            if let Err(error) = self.remote.merge_cart(token, anonymous).await {
                tracing::warn!(%error, items = anonymous.len(), "cart merge failed, keeping anonymous cart");
                self.save_local(anonymous);
                return SyncOutcome::Fallback { items: anonymous.to_vec(), error };
            }
            tracing::info!(items = anonymous.len(), "anonymous cart merged into account");
        }
        self.load(Some(token)).await
    }

    pub fn clear_local(&mut self) {
        if let Err(err) = self.local.clear() {
            tracing::warn!(error = %err, "failed to clear local cart");
        }
    }

    pub fn stored_token(&self) -> Option<String> { self.local.token() }

    pub fn store_identity(&mut self, token: &str, user: &UserProfile) {
        if let Err(err) = self.local.store_identity(token, user) {
            tracing::warn!(error = %err, "failed to persist session identity");
        }
    }

    pub fn clear_identity(&mut self) {
        if let Err(err) = self.local.clear_identity() {
            tracing::warn!(error = %err, "failed to clear session identity");
        }
    }

    fn adopt_remote(&mut self, items: Vec<LineItem>) -> SyncOutcome {
        self.save_local(&items);
        self.last_sync = SyncSource::Remote;
        SyncOutcome::Remote(items)
    }

    fn save_local(&mut self, items: &[LineItem]) {
        match self.local.save(items) {
            Ok(()) => self.last_sync = SyncSource::Local,
            Err(err) => tracing::warn!(error = %err, "failed to write local cart"),
        }
    }
}
