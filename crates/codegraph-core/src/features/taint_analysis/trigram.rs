//! Wildcard-pattern trigram index, grounded on `trcr/index/trigram.py`:
//! extract literal trigrams, index trigram -> pattern ids, query by
//! trigram intersection; also compiles `*`-wildcard patterns to anchored,
//! case-insensitive regex with an LRU-style cache.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_MIN_TRIGRAM_LENGTH: usize = 3;
pub const DEFAULT_MAX_PATTERNS: usize = 100_000;
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 10_000;
pub const DEFAULT_REGEX_TIMEOUT_MS: u64 = 1000;

static REGEX_CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Compiles a `*`-wildcard pattern into an anchored (unless wildcard-
/// prefixed/suffixed), case-insensitive regex. Compiled regexes are cached.
pub fn compile_wildcard_to_regex(pattern: &str) -> Regex {
    if let Some(cached) = REGEX_CACHE.lock().unwrap().get(pattern) {
        return cached.clone();
    }

    let mut escaped = regex::escape(pattern);
    escaped = escaped.replace("\\*", ".*");

    let prefixed = pattern.starts_with('*');
    let suffixed = pattern.ends_with('*');
    let body = if prefixed && suffixed {
        escaped
    } else if prefixed {
        format!("{escaped}$")
    } else if suffixed {
        format!("^{escaped}")
    } else {
        format!("^{escaped}$")
    };

    let full = format!("(?i){body}");
    let regex = Regex::new(&full).unwrap_or_else(|_| Regex::new("(?i)$^").unwrap());
    REGEX_CACHE.lock().unwrap().insert(pattern.to_string(), regex.clone());
    regex
}

fn trigrams_of(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < DEFAULT_MIN_TRIGRAM_LENGTH {
        return Vec::new();
    }
    chars.windows(DEFAULT_MIN_TRIGRAM_LENGTH).map(|w| w.iter().collect::<String>().to_lowercase()).collect()
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TrigramStats {
    pub pattern_count: usize,
    pub trigram_count: usize,
}

/// Maps length-3 windows of a pattern's longest literal substring to the
/// rule/pattern IDs that contain it, for O(T) candidate generation.
pub struct TrigramIndex {
    trigram_to_ids: HashMap<String, Vec<String>>,
    pattern_count: usize,
    max_patterns: usize,
}

impl TrigramIndex {
    pub fn new(max_patterns: usize) -> Self {
        Self { trigram_to_ids: HashMap::new(), pattern_count: 0, max_patterns }
    }

    pub fn add_pattern(&mut self, id: &str, literal: &str) -> Result<(), String> {
        if literal.is_empty() {
            return Err("empty pattern rejected".to_string());
        }
        if self.pattern_count >= self.max_patterns {
            return Err(format!("trigram index at capacity ({})", self.max_patterns));
        }
        for tg in trigrams_of(literal) {
            self.trigram_to_ids.entry(tg).or_default().push(id.to_string());
        }
        self.pattern_count += 1;
        Ok(())
    }

    pub fn search(&self, query: &str, max_query_length: usize) -> Result<Vec<String>, String> {
        if query.len() > max_query_length {
            return Err(format!("query length {} exceeds max {}", query.len(), max_query_length));
        }
        let query_trigrams = trigrams_of(query);
        if query_trigrams.is_empty() {
            return Ok(Vec::new());
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tg in &query_trigrams {
            if let Some(ids) = self.trigram_to_ids.get(tg) {
                for id in ids {
                    *counts.entry(id.as_str()).or_insert(0) += 1;
                }
            }
        }
        let mut result: Vec<String> = counts.into_keys().map(|s| s.to_string()).collect();
        result.sort();
        Ok(result)
    }

    pub fn size(&self) -> usize {
        self.pattern_count
    }

    pub fn stats(&self) -> TrigramStats {
        TrigramStats { pattern_count: self.pattern_count, trigram_count: self.trigram_to_ids.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_prefix_and_suffix() {
        let re = compile_wildcard_to_regex("*.sql.*");
        assert!(re.is_match("sink.sql.sqlite3"));
        assert!(!re.is_match("sink.json.parse"));
    }

    #[test]
    fn exact_anchored_pattern() {
        let re = compile_wildcard_to_regex("os.system");
        assert!(re.is_match("os.system"));
        assert!(!re.is_match("os.system.call"));
    }

    #[test]
    fn trigram_search_finds_substring_match() {
        let mut idx = TrigramIndex::new(DEFAULT_MAX_PATTERNS);
        idx.add_pattern("rule1", "sqlite3.execute").unwrap();
        let hits = idx.search("execute", DEFAULT_MAX_QUERY_LENGTH).unwrap();
        assert!(hits.contains(&"rule1".to_string()));
    }

    #[test]
    fn empty_pattern_rejected() {
        let mut idx = TrigramIndex::new(DEFAULT_MAX_PATTERNS);
        assert!(idx.add_pattern("r1", "").is_err());
    }

    #[test]
    fn query_length_dos_guard() {
        let idx = TrigramIndex::new(DEFAULT_MAX_PATTERNS);
        let long = "a".repeat(20_000);
        assert!(idx.search(&long, DEFAULT_MAX_QUERY_LENGTH).is_err());
    }
}
