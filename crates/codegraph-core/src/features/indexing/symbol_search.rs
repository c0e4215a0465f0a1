//! Three-layer symbol lookup: exact hash, edit-distance, trigram Jaccard
//! (§4.14).

use std::collections::HashMap;

use crate::errors::{CoreError, CoreResult};
use crate::shared::models::Occurrence;

fn trigrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return vec![s.to_string()];
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;
    let sa: HashSet<&String> = a.iter().collect();
    let sb: HashSet<&String> = b.iter().collect();
    if sa.is_empty() && sb.is_empty() {
        return 1.0;
    }
    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; lb + 1]; la + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=lb {
        dp[0][j] = j;
    }
    for i in 1..=la {
        for j in 1..=lb {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1).min(dp[i][j - 1] + 1).min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[la][lb]
}

/// An index over `Occurrence`s keyed by `symbol_id`, supporting exact,
/// edit-distance, and trigram fuzzy lookup. Non-ASCII symbol text
/// (Korean, Japanese, ...) passes through every layer unchanged.
pub struct SymbolSearchLayer {
    by_symbol: HashMap<String, Vec<Occurrence>>,
    trigram_index: HashMap<String, Vec<String>>,
    max_edit_distance: usize,
    trigram_threshold: f64,
    max_query_length: usize,
}

impl SymbolSearchLayer {
    pub fn new(max_edit_distance: usize, trigram_threshold: f64, max_query_length: usize) -> Self {
        Self {
            by_symbol: HashMap::new(),
            trigram_index: HashMap::new(),
            max_edit_distance,
            trigram_threshold,
            max_query_length,
        }
    }

    pub fn index(&mut self, occurrences: Vec<Occurrence>) {
        self.by_symbol.clear();
        self.trigram_index.clear();
        for occ in occurrences {
            for tg in trigrams(&occ.symbol_id) {
                self.trigram_index.entry(tg).or_default().push(occ.symbol_id.clone());
            }
            self.by_symbol.entry(occ.symbol_id.clone()).or_default().push(occ);
        }
    }

    fn validate_query(&self, query: &str) -> CoreResult<()> {
        if query.len() > self.max_query_length {
            return Err(CoreError::validation(format!(
                "query length {} exceeds max_query_length {}",
                query.len(),
                self.max_query_length
            )));
        }
        Ok(())
    }

    /// L1: exact hash lookup on symbol_id.
    pub fn search_exact(&self, query: &str) -> CoreResult<Vec<Occurrence>> {
        self.validate_query(query)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.by_symbol.get(query).cloned().unwrap_or_default())
    }

    /// L2: SymSpell-style edit-distance lookup (default max distance 2).
    pub fn search_edit_distance(&self, query: &str) -> CoreResult<Vec<Occurrence>> {
        self.validate_query(query)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for (symbol_id, occs) in &self.by_symbol {
            if edit_distance(query, symbol_id) <= self.max_edit_distance {
                results.extend(occs.iter().cloned());
            }
        }
        Ok(results)
    }

    /// L3: trigram Jaccard similarity >= threshold.
    pub fn search_trigram(&self, query: &str) -> CoreResult<Vec<Occurrence>> {
        self.validate_query(query)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let query_trigrams = trigrams(query);
        let mut candidates: std::collections::HashSet<&String> = std::collections::HashSet::new();
        for tg in &query_trigrams {
            if let Some(symbols) = self.trigram_index.get(tg) {
                candidates.extend(symbols.iter());
            }
        }
        let mut results = Vec::new();
        for symbol_id in candidates {
            let candidate_trigrams = trigrams(symbol_id);
            if jaccard(&query_trigrams, &candidate_trigrams) >= self.trigram_threshold {
                if let Some(occs) = self.by_symbol.get(symbol_id) {
                    results.extend(occs.iter().cloned());
                }
            }
        }
        Ok(results)
    }

    /// Runs all three layers, deduplicated by occurrence ID.
    pub fn search(&self, query: &str) -> CoreResult<Vec<Occurrence>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for occ in self
            .search_exact(query)?
            .into_iter()
            .chain(self.search_edit_distance(query)?)
            .chain(self.search_trigram(query)?)
        {
            if seen.insert(occ.id.clone()) {
                out.push(occ);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Span, SymbolRoles};

    fn occ(symbol_id: &str) -> Occurrence {
        Occurrence::new(format!("occ:{symbol_id}"), symbol_id, "f.py", Span::zero(), SymbolRoles::new())
    }

    #[test]
    fn exact_lookup_non_ascii_passthrough() {
        let mut layer = SymbolSearchLayer::new(2, 0.7, 10_000);
        layer.index(vec![occ("한글변수")]);
        let results = layer.search_exact("한글변수").unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn empty_query_returns_empty() {
        let layer = SymbolSearchLayer::new(2, 0.7, 10_000);
        assert!(layer.search("").unwrap().is_empty());
    }

    #[test]
    fn query_length_dos_guard() {
        let layer = SymbolSearchLayer::new(2, 0.7, 10);
        let long_query = "a".repeat(50);
        let err = layer.search_exact(&long_query).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn trigram_fuzzy_recall() {
        let mut layer = SymbolSearchLayer::new(0, 0.5, 10_000);
        layer.index(vec![occ("calculate_total"), occ("unrelated_thing")]);
        let results = layer.search_trigram("calculate_totals").unwrap();
        assert!(results.iter().any(|o| o.symbol_id == "calculate_total"));
    }
}
