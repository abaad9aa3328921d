//! Distributed cache transport abstraction

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// String-valued key/value cache with per-key expiry.
///
/// Payloads are opaque to implementations. A `set_string` on an existing key
/// overwrites the value and restarts its TTL; either the whole value is stored or
/// nothing is.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    /// Read the payload stored under `key`, `None` when absent or expired
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for `ttl`
    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}
