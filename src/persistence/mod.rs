//! Cart persistence: inbound normalization, local durable cache, remote
//! cart API and the two-tier adapter joining them.
pub mod wire;
pub mod local;
pub mod remote;
pub mod adapter;

pub use adapter::{PersistenceAdapter, SyncOutcome, SyncSource};
pub use local::{FileStore, LocalCartCache, LocalStore, MemoryStore, StorageError};
pub use remote::{HttpCartApi, RemoteCartApi, RemoteError, UserProfile};
