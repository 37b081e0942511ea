//! Local durable storage
//!
//! A small key/value store standing in for browser local storage, plus the
//! cart cache layered on top of it: the primary `cart` copy, a timestamped
//! `cart_backup`, and the stored identity (`token`, `user`).

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::aggregates::LineItem;
use crate::persistence::remote::UserProfile;
use crate::persistence::wire;

pub const CART_KEY: &str = "cart";
pub const CART_BACKUP_KEY: &str = "cart_backup";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Backups older than this are never used as a fallback.
pub const BACKUP_MAX_AGE_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait LocalStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { Ok(self.entries.get(key).cloned()) }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self { dir: dir.as_ref().to_path_buf() })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write-then-rename: readers never see a partial file.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct BackupOut<'a> {
    items: &'a [LineItem],
    /// Epoch milliseconds.
    timestamp: i64,
}

#[derive(Deserialize)]
struct BackupIn {
    #[serde(default)]
    items: Vec<Value>,
    timestamp: i64,
}

/// Cart cache over a [`LocalStore`]. Reads never fail: absent or malformed
/// data loads as an empty cart.
pub struct LocalCartCache {
    store: Box<dyn LocalStore>,
}

impl std::fmt::Debug for LocalCartCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("LocalCartCache").finish_non_exhaustive() }
}

impl LocalCartCache {
    pub fn new(store: Box<dyn LocalStore>) -> Self { Self { store } }

    pub fn store(&self) -> &dyn LocalStore { self.store.as_ref() }

    pub fn save(&mut self, items: &[LineItem]) -> Result<(), StorageError> { self.save_at(items, Utc::now()) }

    /// Writes the primary copy and the timestamped backup.
    pub fn save_at(&mut self, items: &[LineItem], now: DateTime<Utc>) -> Result<(), StorageError> {
        self.store.set(CART_KEY, &serde_json::to_string(items)?)?;
        let backup = BackupOut { items, timestamp: now.timestamp_millis() };
        self.store.set(CART_BACKUP_KEY, &serde_json::to_string(&backup)?)?;
        tracing::debug!(items = items.len(), "local cart saved");
        Ok(())
    }

    pub fn load(&self) -> Vec<LineItem> { self.load_at(Utc::now()) }

    /// Primary copy if present; otherwise the backup if it is at most
    /// [`BACKUP_MAX_AGE_DAYS`] old; otherwise empty.
    pub fn load_at(&self, now: DateTime<Utc>) -> Vec<LineItem> {
        match self.read(CART_KEY) {
            Some(json) => wire::parse_items(&json).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "local cart is malformed, starting empty");
                vec![]
            }),
            None => self.load_backup(now),
        }
    }

    fn load_backup(&self, now: DateTime<Utc>) -> Vec<LineItem> {
        let Some(json) = self.read(CART_BACKUP_KEY) else { return vec![] };
        let backup: BackupIn = match serde_json::from_str(&json) {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "cart backup is malformed, ignoring");
                return vec![];
            }
        };
        let Some(saved_at) = DateTime::<Utc>::from_timestamp_millis(backup.timestamp) else { return vec![] };
        if now.signed_duration_since(saved_at) > Duration::days(BACKUP_MAX_AGE_DAYS) {
            tracing::info!(%saved_at, "cart backup expired, ignoring");
            return vec![];
        }
        tracing::info!(%saved_at, "restoring cart from backup");
        wire::items_from_values(backup.items)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(CART_KEY)?;
        self.store.remove(CART_BACKUP_KEY)
    }

    pub fn token(&self) -> Option<String> { self.read(TOKEN_KEY).filter(|t| !t.trim().is_empty()) }

    pub fn user(&self) -> Option<UserProfile> { self.read(USER_KEY).and_then(|json| serde_json::from_str(&json).ok()) }

    pub fn store_identity(&mut self, token: &str, user: &UserProfile) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &serde_json::to_string(user)?)
    }

    pub fn clear_identity(&mut self) -> Result<(), StorageError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|err| {
            tracing::warn!(key, error = %err, "local store read failed");
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ItemId;
    use rust_decimal::Decimal;

    fn items() -> Vec<LineItem> {
        vec![LineItem::new(ItemId::from("a"), "Kings", Decimal::new(100, 0)).with_quantity(2)]
    }

    fn backup_json(age: Duration) -> String {
        let timestamp = (Utc::now() - age).timestamp_millis();
        format!(r#"{{"items":[{{"id":"a","name":"Kings","price":100,"quantity":2}}],"timestamp":{timestamp}}}"#)
    }

    #[test]
    fn test_save_then_load() {
        let mut cache = LocalCartCache::new(Box::new(MemoryStore::new()));
        cache.save(&items()).unwrap();
        assert_eq!(cache.load(), items());
        assert!(cache.store().get(CART_BACKUP_KEY).unwrap().is_some());
    }

    #[test]
    fn test_bare_reference_entry_survives_restart() {
        let ingested = wire::parse_items(r#"[{"product":"p1","price":10,"quantity":2}]"#).unwrap();
        assert_eq!(ingested.len(), 1);
        let mut cache = LocalCartCache::new(Box::new(MemoryStore::new()));
        cache.save(&ingested).unwrap();
        let reloaded = cache.load();
        assert_eq!(reloaded, ingested);
        assert_eq!(reloaded[0].id.as_str(), "p1");
        assert_eq!(reloaded[0].quantity.value(), 2);
    }

    #[test]
    fn test_fresh_backup_used_when_primary_missing() {
        let store = MemoryStore::new().with_entry(CART_BACKUP_KEY, backup_json(Duration::days(6)));
        let cache = LocalCartCache::new(Box::new(store));
        assert_eq!(cache.load(), items());
    }

    #[test]
    fn test_expired_backup_ignored() {
        let store = MemoryStore::new().with_entry(CART_BACKUP_KEY, backup_json(Duration::days(8)));
        let cache = LocalCartCache::new(Box::new(store));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_backup_age_boundary() {
        let saved = DateTime::<Utc>::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap();
        let mut cache = LocalCartCache::new(Box::new(MemoryStore::new()));
        cache.save_at(&items(), saved).unwrap();
        cache.store.remove(CART_KEY).unwrap();
        assert_eq!(cache.load_at(saved + Duration::days(7)), items());
        assert!(cache.load_at(saved + Duration::days(7) + Duration::seconds(1)).is_empty());
    }

    #[test]
    fn test_malformed_primary_is_empty() {
        let store = MemoryStore::new()
            .with_entry(CART_KEY, "{oops")
            .with_entry(CART_BACKUP_KEY, backup_json(Duration::hours(1)));
        let cache = LocalCartCache::new(Box::new(store));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_identity() {
        let mut cache = LocalCartCache::new(Box::new(MemoryStore::new()));
        assert!(cache.token().is_none());
        let user = UserProfile { id: "u1".into(), name: Some("Asha".into()), email: None };
        cache.store_identity("tok", &user).unwrap();
        assert_eq!(cache.token().as_deref(), Some("tok"));
        assert_eq!(cache.user(), Some(user));
        cache.clear_identity().unwrap();
        assert!(cache.token().is_none() && cache.user().is_none());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();
        assert!(store.get(CART_KEY).unwrap().is_none());
        store.set(CART_KEY, "[]").unwrap();
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("[]"));
        store.remove(CART_KEY).unwrap();
        store.remove(CART_KEY).unwrap();
        assert!(store.get(CART_KEY).unwrap().is_none());
    }
}
