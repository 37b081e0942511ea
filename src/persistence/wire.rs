//! Inbound item shapes and their normalization.
//!
//! Cart entries reach us from the remote API and from local storage in
//! several shapes: the id may sit under `productId`, `_id` or `id`, the
//! product may be populated inline or referenced by id, and numbers may be
//! strings. [`normalize_item`] is the only place these shapes are resolved.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;
use crate::domain::aggregates::{LineItem, Product};
use crate::domain::value_objects::{ItemId, Money, Quantity};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(default, deserialize_with = "flexible_string")]
    pub product_id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "flexible_string")]
    pub mongo_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_number")]
    #[validate(range(min = 0.0, max = 1_000_000_000_000.0))]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_number")]
    #[validate(range(min = 0.0, max = 1_000_000_000_000.0))]
    pub original_price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_number")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// A cart entry's `product` field: populated document or bare reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(RawProduct),
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(rename = "_id", default, deserialize_with = "flexible_string")]
    pub mongo_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_number")]
    #[validate(range(min = 0.0, max = 1_000_000_000_000.0))]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_number")]
    #[validate(range(min = 0.0, max = 1_000_000_000_000.0))]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, alias = "countInStock", deserialize_with = "flexible_number")]
    pub stock: Option<f64>,
}

impl RawProduct {
    fn item_id(&self) -> Option<String> { self.mongo_id.clone().or_else(|| self.id.clone()) }
}

/// Resolves one inbound entry into a canonical [`LineItem`].
///
/// Id precedence: `productId`, populated `product._id` / `product.id`,
/// `product` reference, `_id`, `id`. Entries without an id or price, with a
/// quantity that is not a positive whole number, or failing validation are
/// dropped. A missing name is kept as an empty string.
pub fn normalize_item(raw: RawLineItem) -> Option<LineItem> {
    if let Err(errors) = raw.validate() {
        tracing::warn!(%errors, "dropping invalid cart entry");
        return None;
    }
    let populated = match &raw.product {
        Some(ProductRef::Populated(p)) => {
            if let Err(errors) = p.validate() {
                tracing::warn!(%errors, "dropping cart entry with invalid product");
                return None;
            }
            Some(p)
        }
        _ => None,
    };
    let reference = match &raw.product { Some(ProductRef::Id(id)) => Some(id.clone()), _ => None };

    let Some(id) = raw.product_id.clone()
        .or_else(|| populated.and_then(RawProduct::item_id))
        .or(reference)
        .or_else(|| raw.mongo_id.clone())
        .or_else(|| raw.id.clone())
        .and_then(ItemId::new)
    else {
        tracing::warn!("dropping cart entry without an id");
        return None;
    };

    let Some(price) = populated.and_then(|p| p.price).or(raw.price).and_then(to_decimal) else {
        tracing::warn!(item_id = %id, "dropping cart entry without a price");
        return None;
    };

    let quantity = raw.quantity.unwrap_or(1.0);
    if !quantity.is_finite() || quantity < 1.0 || quantity.fract() != 0.0 || quantity > f64::from(u32::MAX) {
        tracing::warn!(item_id = %id, quantity, "dropping cart entry with invalid quantity");
        return None;
    }

    let images = populated.and_then(|p| p.images.clone()).or_else(|| raw.images.clone()).unwrap_or_default();
    Some(LineItem {
        name: populated.and_then(|p| p.name.clone()).or_else(|| raw.name.clone()).unwrap_or_default(),
        price,
        original_price: populated.and_then(|p| p.original_price).or(raw.original_price).and_then(to_decimal),
        quantity: Quantity::new(quantity as u32),
        image: populated.and_then(|p| p.image.clone()).or_else(|| raw.image.clone()).or_else(|| images.first().cloned()),
        images,
        id,
    })
}

pub fn normalize_items(raws: Vec<RawLineItem>) -> Vec<LineItem> {
    raws.into_iter().filter_map(normalize_item).collect()
}

/// Parses a JSON array of cart entries. Elements that do not deserialize
/// are skipped; a document that is not an array is an error.
pub fn parse_items(json: &str) -> Result<Vec<LineItem>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    Ok(items_from_values(values))
}

pub fn items_from_values(values: Vec<Value>) -> Vec<LineItem> {
    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<RawLineItem>(v) {
            Ok(raw) => normalize_item(raw),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed cart entry");
                None
            }
        })
        .collect()
}

pub fn normalize_product(raw: RawProduct, currency: &str) -> Option<Product> {
    if raw.validate().is_err() { return None; }
    let id = raw.item_id().and_then(ItemId::new)?;
    let price = raw.price.and_then(to_decimal)?;
    let mut product = Product::new(id, raw.name.unwrap_or_default(), Money::new(price, currency));
    if let Some(original) = raw.original_price.and_then(to_decimal) {
        product = product.with_original_price(Money::new(original, currency));
    }
    let images = raw.images.unwrap_or_default();
    let images = if images.is_empty() { raw.image.into_iter().collect() } else { images };
    product = product.with_images(images);
    if let Some(stock) = raw.stock.filter(|s| s.is_finite()) {
        product = product.with_stock(stock.max(0.0).min(f64::from(u32::MAX)) as u32);
    }
    Some(product)
}

fn to_decimal(value: f64) -> Option<Decimal> { Decimal::try_from(value).ok() }

fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn flexible_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
