pub mod file_cache;
pub mod memory_cache;
pub mod tiered_cache;

pub use file_cache::{FileCache, FileCacheStats};
pub use memory_cache::{MemoryCache, MemoryCacheStats};
pub use tiered_cache::{cache_key, TieredCache, TieredCacheTelemetry};
