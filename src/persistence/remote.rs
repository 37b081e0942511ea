//! Remote cart API client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::domain::aggregates::{LineItem, Product};
use crate::domain::value_objects::ItemId;
use crate::persistence::wire::{self, RawProduct};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// The server refused the credentials, as opposed to being unreachable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Status { status: 403, .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Backend cart, wishlist and session endpoints.
///
/// Cart-returning calls hand back the server's authoritative list, already
/// normalized.
#[automock]
#[async_trait]
pub trait RemoteCartApi: Send + Sync {
    /// `GET /api/auth/me`
    async fn verify_session(&self, token: &str) -> Result<UserProfile, RemoteError>;

    /// `GET /api/cart`
    async fn fetch_cart(&self, token: &str) -> Result<Vec<LineItem>, RemoteError>;

    /// `POST /api/cart` (bulk set)
    async fn replace_cart(&self, token: &str, items: &[LineItem]) -> Result<Vec<LineItem>, RemoteError>;

    /// `POST /api/cart/add`
    async fn add_item(&self, token: &str, item: &LineItem, quantity: u32) -> Result<Vec<LineItem>, RemoteError>;

    /// `PUT /api/cart/update/:id`
    async fn update_quantity(&self, token: &str, item_id: &ItemId, quantity: u32) -> Result<Vec<LineItem>, RemoteError>;

    /// `DELETE /api/cart/remove/:id`
    async fn remove_item(&self, token: &str, item_id: &ItemId) -> Result<Vec<LineItem>, RemoteError>;

    /// `POST /api/cart/merge`
    async fn merge_cart(&self, token: &str, items: &[LineItem]) -> Result<(), RemoteError>;

    /// `GET /api/wishlist`
    async fn fetch_wishlist(&self, token: &str) -> Result<Vec<Product>, RemoteError>;

    /// `POST /api/wishlist`
    async fn add_to_wishlist(&self, token: &str, product_id: &ItemId) -> Result<Vec<Product>, RemoteError>;

    /// `DELETE /api/wishlist/:id`
    async fn remove_from_wishlist(&self, token: &str, product_id: &ItemId) -> Result<Vec<Product>, RemoteError>;
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    cart: Option<Vec<Value>>,
    #[serde(default)]
    wishlist: Option<Vec<Value>>,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl Envelope {
    fn accepted(self) -> Result<Self, RemoteError> {
        if self.success == Some(false) {
            return Err(RemoteError::Rejected(self.message.unwrap_or_else(|| "no reason given".to_string())));
        }
        Ok(self)
    }

    fn into_cart(self) -> Result<Vec<LineItem>, RemoteError> {
        let values = self.accepted()?.cart.ok_or_else(|| RemoteError::InvalidResponse("missing cart".to_string()))?;
        Ok(wire::items_from_values(values))
    }

    fn into_wishlist(self, currency: &str) -> Result<Vec<Product>, RemoteError> {
        let values = self.accepted()?.wishlist.ok_or_else(|| RemoteError::InvalidResponse("missing wishlist".to_string()))?;
        Ok(values
            .into_iter()
            .filter_map(|v| serde_json::from_value::<WishlistEntry>(v).ok())
            .filter_map(|entry| wire::normalize_product(entry.into_raw(), currency))
            .collect())
    }
}

/// Wishlist entries come back either as products or wrapped `{ product }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WishlistEntry {
    Wrapped { product: RawProduct },
    Bare(RawProduct),
}

impl WishlistEntry {
    fn into_raw(self) -> RawProduct {
        match self { Self::Wrapped { product } | Self::Bare(product) => product }
    }
}

/// reqwest-backed [`RemoteCartApi`].
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: Client,
    base_url: String,
    currency: String,
}

impl HttpCartApi {
    pub fn new(config: &StorefrontConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(Duration::from_secs(config.http_timeout_secs)).build()?;
        Ok(Self { client, base_url: config.api_base_url.trim_end_matches('/').to_string(), currency: config.currency.clone() })
    }

    pub fn shared(config: &StorefrontConfig) -> Result<Arc<dyn RemoteCartApi>, RemoteError> {
        Ok(Arc::new(Self::new(config)?))
    }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn get(&self, token: &str, path: &str) -> Result<Envelope, RemoteError> {
        let response = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: reqwest::Method, token: &str, path: &str, body: &B) -> Result<Envelope, RemoteError> {
        let response = self.client.request(method, self.url(path)).bearer_auth(token).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, token: &str, path: &str) -> Result<Envelope, RemoteError> {
        let response = self.client.delete(self.url(path)).bearer_auth(token).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
                StatusCode::NOT_FOUND => Err(RemoteError::NotFound(body)),
                _ => Err(RemoteError::Status { status: status.as_u16(), body }),
            };
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteCartApi for HttpCartApi {
    async fn verify_session(&self, token: &str) -> Result<UserProfile, RemoteError> {
        self.get(token, "/api/auth/me")
            .await?
            .accepted()?
            .user
            .ok_or_else(|| RemoteError::InvalidResponse("missing user".to_string()))
    }

    async fn fetch_cart(&self, token: &str) -> Result<Vec<LineItem>, RemoteError> {
        self.get(token, "/api/cart").await?.into_cart()
    }

    async fn replace_cart(&self, token: &str, items: &[LineItem]) -> Result<Vec<LineItem>, RemoteError> {
        self.send_json(reqwest::Method::POST, token, "/api/cart", &json!({ "items": items })).await?.into_cart()
    }

    async fn add_item(&self, token: &str, item: &LineItem, quantity: u32) -> Result<Vec<LineItem>, RemoteError> {
        let body = json!({ "productId": item.id, "quantity": quantity, "productData": item });
        self.send_json(reqwest::Method::POST, token, "/api/cart/add", &body).await?.into_cart()
    }

    async fn update_quantity(&self, token: &str, item_id: &ItemId, quantity: u32) -> Result<Vec<LineItem>, RemoteError> {
        let path = format!("/api/cart/update/{item_id}");
        self.send_json(reqwest::Method::PUT, token, &path, &json!({ "quantity": quantity })).await?.into_cart()
    }

    async fn remove_item(&self, token: &str, item_id: &ItemId) -> Result<Vec<LineItem>, RemoteError> {
        self.delete(token, &format!("/api/cart/remove/{item_id}")).await?.into_cart()
    }

    async fn merge_cart(&self, token: &str, items: &[LineItem]) -> Result<(), RemoteError> {
        self.send_json(reqwest::Method::POST, token, "/api/cart/merge", &json!({ "items": items })).await?.accepted()?;
        Ok(())
    }

    async fn fetch_wishlist(&self, token: &str) -> Result<Vec<Product>, RemoteError> {
        self.get(token, "/api/wishlist").await?.into_wishlist(&self.currency)
    }

    async fn add_to_wishlist(&self, token: &str, product_id: &ItemId) -> Result<Vec<Product>, RemoteError> {
        self.send_json(reqwest::Method::POST, token, "/api/wishlist", &json!({ "productId": product_id }))
            .await?
            .into_wishlist(&self.currency)
    }

    async fn remove_from_wishlist(&self, token: &str, product_id: &ItemId) -> Result<Vec<Product>, RemoteError> {
        self.delete(token, &format!("/api/wishlist/{product_id}")).await?.into_wishlist(&self.currency)
    }
}
