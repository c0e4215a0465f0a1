//! L1 in-memory cache: LRU bounded simultaneously by entry count and bytes.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::shared::models::IrDocument;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MemoryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub current_bytes: u64,
}

struct Entry {
    doc: Arc<IrDocument>,
    size: u64,
}

struct Inner {
    cache: LruCache<String, Entry>,
    current_bytes: u64,
    max_bytes: u64,
    max_size: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// L1 MemoryCache: LRU, bounded by `max_size` entries *and* `max_bytes`
/// (sum of `IrDocument::estimated_size`). `max_size == 0` makes `set` a
/// no-op (§4.6).
pub struct MemoryCache {
    inner: Mutex<Inner>,
}

impl MemoryCache {
    pub fn new(max_size: usize, max_bytes: u64) -> Self {
        let cap = NonZeroUsize::new(max_size.max(1)).unwrap();
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(cap),
                current_bytes: 0,
                max_bytes,
                max_size,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<IrDocument>> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.cache.get(key) {
            let doc = entry.doc.clone();
            inner.hits += 1;
            Some(doc)
        } else {
            inner.misses += 1;
            None
        }
    }

    /// `set` of an existing key updates byte accounting (subtract old size,
    /// add new); `max_size == 0` makes this a no-op.
    pub fn set(&self, key: String, doc: Arc<IrDocument>) {
        let size = doc.estimated_size();
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            return;
        }
        if let Some(old) = inner.cache.peek(&key) {
            inner.current_bytes = inner.current_bytes.saturating_sub(old.size);
        }
        inner.cache.put(key, Entry { doc, size });
        inner.current_bytes += size;

        while inner.current_bytes > inner.max_bytes {
            match inner.cache.pop_lru() {
                Some((_, evicted)) => {
                    inner.current_bytes = inner.current_bytes.saturating_sub(evicted.size);
                    inner.evictions += 1;
                }
                None => break,
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.cache.clear();
        inner.current_bytes = 0;
    }

    pub fn stats(&self) -> MemoryCacheStats {
        let inner = self.inner.lock();
        MemoryCacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.cache.len(),
            current_bytes: inner.current_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_nodes(n: usize) -> IrDocument {
        use crate::shared::models::{Node, NodeKind, Span};
        let mut doc = IrDocument::new("repo1", "snap1");
        for i in 0..n {
            doc.nodes.push(Node::new(format!("node:{i}"), NodeKind::Function, format!("f{i}"), "f.py").with_span(Span::zero()));
        }
        doc
    }

    #[test]
    fn bounds_respected_under_pressure() {
        let cache = MemoryCache::new(100, 5_000);
        for i in 0..50 {
            cache.set(format!("key{i}"), Arc::new(doc_with_nodes(10)));
        }
        let stats = cache.stats();
        assert!(stats.current_bytes <= 5_000);
        assert!(stats.entries <= 100);
        assert!(stats.evictions > 0);
    }

    #[test]
    fn zero_max_size_is_noop() {
        let cache = MemoryCache::new(0, 1_000_000);
        cache.set("k".into(), Arc::new(doc_with_nodes(1)));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn update_existing_key_corrects_byte_accounting() {
        let cache = MemoryCache::new(10, 1_000_000);
        cache.set("k".into(), Arc::new(doc_with_nodes(5)));
        let after_first = cache.stats().current_bytes;
        cache.set("k".into(), Arc::new(doc_with_nodes(1)));
        let after_second = cache.stats().current_bytes;
        assert!(after_second < after_first);
        assert_eq!(cache.len(), 1);
    }
}
