//! In-memory correlation store (§4.15). Persistent storage is an external
//! collaborator (`CacheStorePort`/`StorageAdapters`, ports-only per spec);
//! this index holds the working set the core computes and searches over.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;

use super::cochange::CoChangeAnalyzer;
use super::models::{CorrelationEntry, CorrelationSearchResult, CorrelationType};
use crate::errors::CoreResult;

#[derive(Default)]
struct Inner {
    entries: Vec<CorrelationEntry>,
}

#[derive(Default)]
pub struct CorrelationIndex {
    inner: RwLock<Inner>,
}

impl CorrelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears existing entries of `correlation_type` before inserting new
    /// ones, to avoid stale data (§4.15 upsert semantics).
    fn upsert(&self, correlation_type: CorrelationType, entries: Vec<CorrelationEntry>) {
        let mut inner = self.inner.write();
        inner.entries.retain(|e| e.correlation_type != correlation_type);
        inner.entries.extend(entries);
    }

    pub fn build_cochange_index(
        &self,
        repo_path: impl AsRef<Path>,
        days: i64,
        min_cochanges: u64,
        min_coupling: f64,
    ) -> CoreResult<usize> {
        let analyzer = CoChangeAnalyzer::new(repo_path);
        let patterns = analyzer.find_strong_couples(days, min_cochanges, min_coupling)?;

        let entries: Vec<CorrelationEntry> = patterns
            .into_iter()
            .map(|p| {
                let mut metadata = BTreeMap::new();
                metadata.insert("confidence_a_to_b".to_string(), p.confidence_a_to_b.to_string());
                metadata.insert("confidence_b_to_a".to_string(), p.confidence_b_to_a.to_string());
                metadata.insert("file_a_changes".to_string(), p.file_a_changes.to_string());
                metadata.insert("file_b_changes".to_string(), p.file_b_changes.to_string());
                CorrelationEntry {
                    source_id: p.file_a,
                    target_id: p.file_b,
                    correlation_type: CorrelationType::CoChange,
                    strength: p.coupling_strength,
                    count: p.cochange_count,
                    metadata,
                }
            })
            .collect();

        let count = entries.len();
        self.upsert(CorrelationType::CoChange, entries);
        Ok(count)
    }

    /// `references` are `(source_fqn, target_fqn, context_fqn)` triples;
    /// co-occurring target symbols within the same context are paired and
    /// counted. Strength = count / total_contexts, scaled x10, capped at 1.0.
    pub fn build_cooccurrence_index(&self, snapshot_id: &str, references: &[(String, String, String)], min_occurrences: u64) -> usize {
        use std::collections::{HashMap, HashSet};

        let mut context_symbols: HashMap<String, HashSet<String>> = HashMap::new();
        for (source_fqn, target_fqn, context_fqn) in references {
            let context = if context_fqn.is_empty() { source_fqn.clone() } else { context_fqn.clone() };
            if context.is_empty() || target_fqn.is_empty() {
                continue;
            }
            context_symbols.entry(context).or_default().insert(target_fqn.clone());
        }

        let total_contexts = context_symbols.len();
        let mut pair_counts: HashMap<(String, String), u64> = HashMap::new();
        for symbols in context_symbols.values() {
            let mut sorted: Vec<&String> = symbols.iter().collect();
            sorted.sort();
            for i in 0..sorted.len() {
                for j in (i + 1)..sorted.len() {
                    *pair_counts.entry((sorted[i].clone(), sorted[j].clone())).or_insert(0) += 1;
                }
            }
        }

        let entries: Vec<CorrelationEntry> = pair_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|((a, b), count)| {
                let raw_strength = if total_contexts > 0 { count as f64 / total_contexts as f64 } else { 0.0 };
                let mut metadata = BTreeMap::new();
                metadata.insert("snapshot_id".to_string(), snapshot_id.to_string());
                CorrelationEntry {
                    source_id: a,
                    target_id: b,
                    correlation_type: CorrelationType::CoOccurrence,
                    strength: (raw_strength * 10.0).min(1.0),
                    count,
                    metadata,
                }
            })
            .collect();

        let count = entries.len();
        self.upsert(CorrelationType::CoOccurrence, entries);
        count
    }

    pub fn search(
        &self,
        entity_id: &str,
        correlation_type: Option<CorrelationType>,
        limit: usize,
        min_strength: f64,
    ) -> Vec<CorrelationSearchResult> {
        let inner = self.inner.read();
        let mut results: Vec<CorrelationSearchResult> = inner
            .entries
            .iter()
            .filter(|e| e.source_id == entity_id || e.target_id == entity_id)
            .filter(|e| correlation_type.map(|t| t == e.correlation_type).unwrap_or(true))
            .filter(|e| e.strength >= min_strength)
            .map(|e| {
                let other_id = if e.source_id == entity_id { e.target_id.clone() } else { e.source_id.clone() };
                CorrelationSearchResult {
                    entity_id: other_id,
                    correlation_type: e.correlation_type,
                    strength: e.strength,
                    count: e.count,
                    metadata: e.metadata.clone(),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal).then_with(|| b.count.cmp(&a.count))
        });
        results.truncate(limit);
        results
    }

    pub fn clear(&self, correlation_type: Option<CorrelationType>) -> usize {
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        match correlation_type {
            Some(t) => inner.entries.retain(|e| e.correlation_type != t),
            None => inner.entries.clear(),
        }
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooccurrence_strength_scales_and_caps() {
        let index = CorrelationIndex::new();
        let refs = vec![
            ("ctx".to_string(), "a".to_string(), "ctx".to_string()),
            ("ctx".to_string(), "b".to_string(), "ctx".to_string()),
        ];
        let n = index.build_cooccurrence_index("snap1", &refs, 1);
        assert_eq!(n, 1);
        let results = index.search("a", Some(CorrelationType::CoOccurrence), 10, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_id, "b");
        assert!(results[0].strength <= 1.0);
    }

    #[test]
    fn upsert_clears_stale_entries_of_same_type() {
        let index = CorrelationIndex::new();
        let refs_a = vec![("ctx".to_string(), "a".to_string(), "ctx".to_string()), ("ctx".to_string(), "b".to_string(), "ctx".to_string())];
        index.build_cooccurrence_index("snap1", &refs_a, 1);
        assert_eq!(index.len(), 1);

        let refs_b = vec![("ctx2".to_string(), "c".to_string(), "ctx2".to_string()), ("ctx2".to_string(), "d".to_string(), "ctx2".to_string())];
        index.build_cooccurrence_index("snap2", &refs_b, 1);
        assert_eq!(index.len(), 1);
        assert!(index.search("a", None, 10, 0.0).is_empty());
        assert!(!index.search("c", None, 10, 0.0).is_empty());
    }

    #[test]
    fn search_sorts_by_strength_then_count() {
        let index = CorrelationIndex::new();
        index.upsert(
            CorrelationType::CoSearch,
            vec![
                CorrelationEntry { source_id: "x".into(), target_id: "low".into(), correlation_type: CorrelationType::CoSearch, strength: 0.2, count: 10, metadata: BTreeMap::new() },
                CorrelationEntry { source_id: "x".into(), target_id: "high".into(), correlation_type: CorrelationType::CoSearch, strength: 0.9, count: 1, metadata: BTreeMap::new() },
            ],
        );
        let results = index.search("x", None, 10, 0.0);
        assert_eq!(results[0].entity_id, "high");
        assert_eq!(results[1].entity_id, "low");
    }
}
