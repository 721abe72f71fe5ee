use crate::CoreResult;

use async_trait::async_trait;

/// Durable string blob store keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written.
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> CoreResult<()>;
}
