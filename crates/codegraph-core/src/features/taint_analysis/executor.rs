//! Runtime execution engine: candidate generation -> prefilter -> predicate
//! evaluation -> confidence -> match emission (§4.10).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::warn;

use super::domain::{CompiledRule, GeneratorKind, Match, Predicate, TraceInfo};
use super::entity::Entity;
use super::multi_index::MultiIndex;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ExecutorStats {
    pub total_rules: usize,
    pub total_entities: usize,
    pub total_matches: usize,
    pub candidates_generated: usize,
    pub predicates_evaluated: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

fn evaluate_predicate(predicate: &Predicate, entity: &Entity) -> (bool, f64) {
    match predicate.name.as_str() {
        name if name.starts_with("arg_is_tainted(") => {
            let idx_str = &name["arg_is_tainted(".len()..name.len() - 1];
            let idx: usize = idx_str.parse().unwrap_or(usize::MAX);
            (entity.arg_is_tainted(idx), predicate.confidence_adjustment)
        }
        "always_true" => (true, predicate.confidence_adjustment),
        other => {
            warn!(predicate = other, "unknown predicate, treating as failing");
            (false, 0.0)
        }
    }
}

/// Rule execution engine. Rules are sorted by specificity at construction;
/// execution checks the cancellation flag between rules, never between
/// entities, so large rule sets are not starved (§4.10, §5).
pub struct TaintRuleExecutor {
    rules: Vec<CompiledRule>,
    result_cache: Mutex<HashMap<(String, String), Match>>,
    cache_enabled: bool,
    max_cache_size: usize,
    cancel: AtomicBool,
}

impl TaintRuleExecutor {
    pub fn new(mut rules: Vec<CompiledRule>, enable_cache: bool, cache_size: usize) -> Self {
        rules.sort();
        Self {
            rules,
            result_cache: Mutex::new(HashMap::new()),
            cache_enabled: enable_cache,
            max_cache_size: cache_size,
            cancel: AtomicBool::new(false),
        }
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    fn generate_candidates<'a>(&self, rule: &CompiledRule, index: &MultiIndex<'a>) -> Vec<&'a Entity> {
        let mut seen_ids = std::collections::HashSet::new();
        let mut out = Vec::new();
        for generator in &rule.generators {
            let candidates: Vec<&Entity> = match generator {
                GeneratorKind::ExactTypeCall { base_type, call } => index
                    .exact_type_call
                    .get(&(base_type.clone(), call.clone()))
                    .cloned()
                    .unwrap_or_default(),
                GeneratorKind::ExactCall { call } => index.exact_call.get(call).cloned().unwrap_or_default(),
                GeneratorKind::CallPrefix { prefix } => index.by_call_prefix(prefix),
                GeneratorKind::TypeSuffix { suffix } => index.by_type_suffix(suffix),
                GeneratorKind::TypeTrigram { literal } => {
                    let ids = index.trigram.search(literal, super::trigram::DEFAULT_MAX_QUERY_LENGTH).unwrap_or_default();
                    let id_set: std::collections::HashSet<&str> = ids.iter().map(|s| s.as_str()).collect();
                    index.all.iter().filter(|e| id_set.contains(e.id.as_str())).copied().collect()
                }
                GeneratorKind::Fallback => index.all.clone(),
            };
            for c in candidates {
                if seen_ids.insert(c.id.clone()) {
                    out.push(c);
                }
            }
            if !out.is_empty() {
                break; // most-specific generator that yields anything wins
            }
        }
        out
    }

    fn passes_prefilters(rule: &CompiledRule, entity: &Entity) -> bool {
        for pf in &rule.prefilters {
            if let Some(prefix) = &pf.call_starts_with {
                if !entity.call.as_deref().map(|c| c.starts_with(prefix.as_str())).unwrap_or(false) {
                    return false;
                }
            }
            if let Some(suffix) = &pf.type_ends_with {
                if !entity.base_type.as_deref().map(|t| t.ends_with(suffix.as_str())).unwrap_or(false) {
                    return false;
                }
            }
            if let Some(idx) = pf.has_arg_index {
                if entity.args.len() <= idx {
                    return false;
                }
            }
        }
        true
    }

    pub fn execute(&self, entities: &[Entity], max_trigram_patterns: usize, enable_trace: bool) -> (Vec<Match>, ExecutorStats) {
        let index = MultiIndex::build(entities, max_trigram_patterns);
        let mut stats = ExecutorStats {
            total_rules: self.rules.len(),
            total_entities: entities.len(),
            ..Default::default()
        };
        let mut matches = Vec::new();

        for rule in &self.rules {
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }

            let candidates = self.generate_candidates(rule, &index);
            stats.candidates_generated += candidates.len();

            for entity in candidates {
                if !Self::passes_prefilters(rule, entity) {
                    continue;
                }

                let cache_key = (entity.id.clone(), rule.rule_id.clone());
                if self.cache_enabled {
                    if let Some(cached) = self.result_cache.lock().unwrap().get(&cache_key) {
                        matches.push(cached.clone());
                        stats.cache_hits += 1;
                        continue;
                    }
                    stats.cache_misses += 1;
                }

                let mut confidence = rule.confidence_base;
                let mut passed_all = true;
                for predicate in &rule.predicates {
                    stats.predicates_evaluated += 1;
                    let (passed, adjustment) = evaluate_predicate(predicate, entity);
                    if !passed {
                        passed_all = false;
                        break;
                    }
                    confidence += adjustment;
                }
                if !passed_all {
                    continue;
                }
                confidence = confidence.clamp(0.0, 1.0);
                if !rule.should_report(confidence) {
                    continue;
                }

                let trace = enable_trace.then(|| TraceInfo {
                    generator_used: format!("{:?}", rule.generators.first()),
                    prefilters_passed: rule.prefilters.len(),
                    predicates_evaluated: rule.predicates.len(),
                });

                let m = Match {
                    rule_id: rule.rule_id.clone(),
                    atom_id: rule.atom_id.clone(),
                    entity_id: entity.id.clone(),
                    confidence,
                    specificity: rule.specificity_score,
                    effect_kind: rule.effect.kind,
                    taint_positions: rule.effect.taint_arg_positions.clone(),
                    tier: rule.tier,
                    severity: super::domain::Severity::Medium,
                    tags: Vec::new(),
                    trace,
                };

                if self.cache_enabled {
                    let mut cache = self.result_cache.lock().unwrap();
                    if cache.len() < self.max_cache_size {
                        cache.insert(cache_key, m.clone());
                    }
                }

                stats.total_matches += 1;
                matches.push(m);
            }
        }

        matches.sort_by(|a, b| b.specificity.partial_cmp(&a.specificity).unwrap_or(std::cmp::Ordering::Equal));
        (matches, stats)
    }

    pub fn cache_clear(&self) {
        self.result_cache.lock().unwrap().clear();
    }
}
