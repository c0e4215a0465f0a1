//! Half-open source ranges, interned through a process-wide pool.

use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// A single point in a source file, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A half-open `(start_line, start_col, end_line, end_col)` source range.
///
/// Immutable and value-equal. Spans are obtained from a [`SpanPool`] so that
/// identical ranges share one logical identity across a build session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self { start_line, start_col, end_line, end_col }
    }

    pub fn zero() -> Self {
        Self { start_line: 0, start_col: 0, end_line: 0, end_col: 0 }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn contains(&self, loc: Location) -> bool {
        if loc.line < self.start_line || loc.line > self.end_line {
            return false;
        }
        if loc.line == self.start_line && loc.column < self.start_col {
            return false;
        }
        if loc.line == self.end_line && loc.column >= self.end_col {
            return false;
        }
        true
    }

    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}

/// Runtime statistics for a [`SpanPool`].
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SpanPoolStats {
    pub pool_size: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
}

impl SpanPoolStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

struct Inner {
    cache: LruCache<Span, Arc<Span>>,
    hit_count: u64,
    miss_count: u64,
    eviction_count: u64,
    max_size: usize,
}

/// Process-wide interning pool for [`Span`] values.
///
/// Thread-safe: concurrent `intern` calls with equal tuples observe the same
/// `Arc<Span>` identity. Bounded by `max_size` entries with LRU eviction.
/// `max_size == 0` makes every `intern` call a pass-through no-op (the pool
/// never grows, nothing is cached).
pub struct SpanPool {
    inner: Mutex<Inner>,
}

impl SpanPool {
    pub fn new(max_size: usize) -> Self {
        let cap = NonZeroUsize::new(max_size.max(1)).unwrap();
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(cap),
                hit_count: 0,
                miss_count: 0,
                eviction_count: 0,
                max_size,
            }),
        }
    }

    /// Returns the canonical handle for the given tuple, creating one on
    /// first sight. A no-op passthrough when `max_size == 0`.
    pub fn intern(&self, start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Arc<Span> {
        let span = Span::new(start_line, start_col, end_line, end_col);
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            inner.miss_count += 1;
            return Arc::new(span);
        }
        if let Some(existing) = inner.cache.get(&span) {
            inner.hit_count += 1;
            return existing.clone();
        }
        let before = inner.cache.len();
        let handle = Arc::new(span);
        if let Some((_, _evicted)) = inner.cache.push(span, handle.clone()) {
            inner.eviction_count += 1;
        } else if inner.cache.len() == before && before >= inner.max_size {
            inner.eviction_count += 1;
        }
        inner.miss_count += 1;
        handle
    }

    pub fn intern_batch(&self, tuples: &[(u32, u32, u32, u32)]) -> Vec<Arc<Span>> {
        tuples
            .iter()
            .map(|(sl, sc, el, ec)| self.intern(*sl, *sc, *el, *ec))
            .collect()
    }

    pub fn stats(&self) -> SpanPoolStats {
        let inner = self.inner.lock();
        SpanPoolStats {
            pool_size: inner.cache.len(),
            hit_count: inner.hit_count,
            miss_count: inner.miss_count,
            eviction_count: inner.eviction_count,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.cache.clear();
    }

    pub fn reset_stats(&self) {
        let mut inner = self.inner.lock();
        inner.hit_count = 0;
        inner.miss_count = 0;
        inner.eviction_count = 0;
    }
}

impl Default for SpanPool {
    fn default() -> Self {
        Self::new(100_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;
    use std::thread;

    #[test]
    fn contains_line_bounds() {
        let s = Span::new(3, 0, 7, 5);
        assert!(!s.contains_line(2));
        assert!(s.contains_line(3));
        assert!(s.contains_line(7));
        assert!(!s.contains_line(8));
    }

    #[test]
    fn line_count_inclusive() {
        let s = Span::new(3, 0, 3, 5);
        assert_eq!(s.line_count(), 1);
        let s2 = Span::new(3, 0, 7, 5);
        assert_eq!(s2.line_count(), 5);
    }

    #[test]
    fn intern_same_tuple_same_identity() {
        let pool = SpanPool::new(100);
        let a = pool.intern(1, 0, 1, 5);
        let b = pool.intern(1, 0, 1, 5);
        assert!(StdArc::ptr_eq(&a, &b));
        assert_eq!(pool.stats().hit_count, 1);
    }

    #[test]
    fn intern_concurrent_same_identity() {
        let pool = StdArc::new(SpanPool::new(1000));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || pool.intern(2, 2, 4, 4))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert!(StdArc::ptr_eq(&results[0], r));
        }
    }

    #[test]
    fn zero_max_size_is_noop() {
        let pool = SpanPool::new(0);
        let a = pool.intern(0, 0, 0, 0);
        let b = pool.intern(0, 0, 0, 0);
        assert!(!StdArc::ptr_eq(&a, &b));
        assert_eq!(pool.stats().pool_size, 0);
    }

    #[test]
    fn eviction_under_pressure() {
        let pool = SpanPool::new(4);
        for i in 0..20u32 {
            pool.intern(i, 0, i, 1);
        }
        let stats = pool.stats();
        assert!(stats.pool_size <= 4);
        assert!(stats.eviction_count > 0);
    }
}
