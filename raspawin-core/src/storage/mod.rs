pub mod memory_store;
pub mod snapshot_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use snapshot_store::{PlayerSnapshot, SnapshotStore};
pub use sqlite_store::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;

/// Opaque key-value persistence. Values are serialized snapshots.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
