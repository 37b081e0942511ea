//! HttpCartApi against an in-process backend.

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use storefront_cart::persistence::{HttpCartApi, RemoteCartApi, RemoteError};
use storefront_cart::{ItemId, LineItem, StorefrontConfig};

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer tok")
}

async fn get_cart(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "cart": [
            { "_id": "row-1", "quantity": 2, "product": { "_id": "p1", "name": "Kings", "price": 100, "originalPrice": 120 } },
            { "_id": "row-2", "quantity": 0, "product": { "_id": "p2", "name": "Lights", "price": 80 } }
        ]
    })))
}

async fn add(Json(body): Json<Value>) -> Json<Value> {
    let quantity = body["quantity"].as_u64().unwrap_or(0) + 1;
    Json(json!({ "success": true, "cart": [ { "productId": body["productId"], "quantity": quantity, "price": body["productData"]["price"] } ] }))
}

async fn update(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    if id == "locked" {
        return Json(json!({ "success": false, "message": "item locked" }));
    }
    Json(json!({ "success": true, "cart": [ { "productId": id, "quantity": body["quantity"], "price": 10 } ] }))
}

async fn remove(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({ "success": true, "cart": [] }))
}

async fn merge(Json(body): Json<Value>) -> Json<Value> {
    let count = body["items"].as_array().map_or(0, Vec::len);
    Json(json!({ "success": count > 0 }))
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({ "user": { "_id": "u1", "name": "Asha" } })))
}

async fn wishlist() -> Json<Value> {
    Json(json!({ "wishlist": [ { "product": { "_id": "p9", "name": "Menthol", "price": 90 } }, { "_id": "p8", "name": "Slims", "price": 70 } ] }))
}

async fn spawn_backend() -> HttpCartApi {
    let app = Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add))
        .route("/api/cart/update/:id", put(update))
        .route("/api/cart/remove/:id", delete(remove))
        .route("/api/cart/merge", post(merge))
        .route("/api/auth/me", get(me))
        .route("/api/wishlist", get(wishlist));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let config = StorefrontConfig { api_base_url: format!("http://{addr}/"), ..StorefrontConfig::default() };
    HttpCartApi::new(&config).unwrap()
}

#[tokio::test]
async fn fetch_cart_normalizes_entries() {
    let api = spawn_backend().await;
    let items = api.fetch_cart("tok").await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.as_str(), "p1");
    assert_eq!(items[0].name, "Kings");
    assert_eq!(items[0].quantity.value(), 2);
    assert_eq!(items[0].unit_markdown(), Decimal::new(20, 0));
}

#[tokio::test]
async fn bad_token_is_unauthorized() {
    let api = spawn_backend().await;
    let err = api.fetch_cart("nope").await.unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized));
    assert!(err.is_auth_failure());
    assert!(api.verify_session("nope").await.unwrap_err().is_auth_failure());
}

#[tokio::test]
async fn verify_session_returns_user() {
    let api = spawn_backend().await;
    let user = api.verify_session("tok").await.unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.name.as_deref(), Some("Asha"));
}

#[tokio::test]
async fn add_sends_product_data() {
    let api = spawn_backend().await;
    let item = LineItem::new(ItemId::from("p3"), "Classic", Decimal::new(45, 0));
    let items = api.add_item("tok", &item, 1).await.unwrap();
    assert_eq!(items[0].id.as_str(), "p3");
    assert_eq!(items[0].quantity.value(), 2);
    assert_eq!(items[0].price, Decimal::new(45, 0));
}

#[tokio::test]
async fn update_and_remove() {
    let api = spawn_backend().await;
    let items = api.update_quantity("tok", &ItemId::from("p4"), 7).await.unwrap();
    assert_eq!(items[0].quantity.value(), 7);
    assert!(api.remove_item("tok", &ItemId::from("p4")).await.unwrap().is_empty());
}

#[tokio::test]
async fn unsuccessful_response_is_rejected() {
    let api = spawn_backend().await;
    let err = api.update_quantity("tok", &ItemId::from("locked"), 2).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(message) if message == "item locked"));
    assert!(api.merge_cart("tok", &[]).await.is_err());
}

#[tokio::test]
async fn unexpected_status_keeps_code() {
    let api = spawn_backend().await;
    let err = api.replace_cart("tok", &[]).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 405, .. }));
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn wishlist_accepts_wrapped_and_bare_entries() {
    let api = spawn_backend().await;
    let products = api.fetch_wishlist("tok").await.unwrap();
    let ids: Vec<&str> = products.iter().map(|p| p.id().as_str()).collect();
    assert_eq!(ids, ["p9", "p8"]);
    assert_eq!(products[0].price().currency(), "INR");
}
