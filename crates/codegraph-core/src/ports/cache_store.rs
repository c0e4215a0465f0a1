//! Generic cache store port (§6.2): `get/set/delete` with optional TTL
//! and batch variants, for an external (e.g. Redis-backed) store. Note
//! §9's Redis/sync-vs-async decision: no client is vendored here, this
//! is a trait signature only.

use std::time::Duration;

use crate::errors::CoreResult;

pub trait CacheStorePort: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CoreResult<()>;
    fn delete(&self, key: &str) -> CoreResult<()>;
    fn get_batch(&self, keys: &[String]) -> CoreResult<Vec<Option<Vec<u8>>>>;
    fn set_batch(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> CoreResult<()>;
}
