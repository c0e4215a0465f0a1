//! Fusion pipeline: intent weighting -> RRF -> expansion boost -> consensus
//! -> feature vectors -> ranked results (§4.13). Grounded on
//! `fusion_engine.py`'s `FusionEngineV3.fuse` stage order.

use std::collections::HashMap;

use tracing::debug;

use super::models::{
    ConsensusStats, FeatureVector, FusedResultV3, IntentProbability, IntentWeights, RankedHit, StrategyContribution,
    WeightProfile,
};

const EXPANSION_BOOST_FACTOR: f64 = 1.1;
const FLOW_BOOST_THRESHOLD: f64 = 0.2;
const FLOW_BOOST_FACTOR: f64 = 1.3;
const SYMBOL_BOOST_THRESHOLD: f64 = 0.3;
const SYMBOL_BOOST_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Default)]
pub struct QueryExpansions {
    pub symbols: Vec<String>,
    pub file_paths: Vec<String>,
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChunkMetadata {
    pub chunk_size: usize,
    pub symbol_type: String,
}

pub struct FusionEngine {
    rrf_k: f64,
    intent_weights: IntentWeights,
}

impl FusionEngine {
    pub fn new(rrf_k: f64) -> Self {
        Self { rrf_k, intent_weights: IntentWeights::default() }
    }

    /// §4.13 step 1: linear-combine per-intent profiles, apply non-linear
    /// dominant-intent boosts, re-normalize to sum to 1.
    fn calculate_intent_weights(&self, intent_prob: &IntentProbability) -> WeightProfile {
        let profiles = [
            (intent_prob.symbol, self.intent_weights.symbol),
            (intent_prob.flow, self.intent_weights.flow),
            (intent_prob.concept, self.intent_weights.concept),
            (intent_prob.code, self.intent_weights.code),
            (intent_prob.balanced, self.intent_weights.balanced),
        ];

        let mut combined = WeightProfile::default();
        for (p, profile) in profiles {
            combined.vec += p * profile.vec;
            combined.lex += p * profile.lex;
            combined.sym += p * profile.sym;
            combined.graph += p * profile.graph;
        }

        let dominant = intent_prob.dominant_intent();
        if dominant == "flow" && intent_prob.flow > FLOW_BOOST_THRESHOLD {
            combined.graph *= FLOW_BOOST_FACTOR;
            debug!(boost_factor = FLOW_BOOST_FACTOR, "flow_intent_boost_applied");
        } else if dominant == "symbol" && intent_prob.symbol > SYMBOL_BOOST_THRESHOLD {
            combined.sym *= SYMBOL_BOOST_FACTOR;
            debug!(boost_factor = SYMBOL_BOOST_FACTOR, "symbol_intent_boost_applied");
        }

        let total = combined.vec + combined.lex + combined.sym + combined.graph;
        if total > 0.0 {
            combined.vec /= total;
            combined.lex /= total;
            combined.sym /= total;
            combined.graph /= total;
        }
        combined
    }

    /// §4.13 step 2: per-strategy RRF score, weighted and summed into a
    /// per-chunk base score. Returns (base_scores, rrf_scores_by_strategy).
    fn rrf_normalize(
        &self,
        hits_by_strategy: &HashMap<String, Vec<RankedHit>>,
        weights: &WeightProfile,
    ) -> (HashMap<String, f64>, HashMap<String, HashMap<String, f64>>) {
        let mut base_scores: HashMap<String, f64> = HashMap::new();
        let mut rrf_scores: HashMap<String, HashMap<String, f64>> = HashMap::new();

        for (strategy, hits) in hits_by_strategy {
            let weight = self.weight_for_strategy(strategy, weights);
            for hit in hits {
                let score = 1.0 / (self.rrf_k + hit.rank as f64);
                *base_scores.entry(hit.chunk_id.clone()).or_insert(0.0) += score * weight;
                rrf_scores.entry(hit.chunk_id.clone()).or_default().insert(strategy.clone(), score);
            }
        }
        (base_scores, rrf_scores)
    }

    fn weight_for_strategy(&self, strategy: &str, weights: &WeightProfile) -> f64 {
        match strategy {
            "vector" => weights.vec,
            "lexical" => weights.lex,
            "symbol" => weights.sym,
            "graph" => weights.graph,
            _ => 0.0,
        }
    }

    /// §4.13 step 3.
    fn apply_expansion_boost(
        &self,
        base_scores: &mut HashMap<String, f64>,
        hits_by_strategy: &HashMap<String, Vec<RankedHit>>,
        expansions: &QueryExpansions,
    ) {
        if expansions.symbols.is_empty() && expansions.file_paths.is_empty() && expansions.modules.is_empty() {
            return;
        }

        let mut chunk_info: HashMap<String, (String, String)> = HashMap::new();
        for hits in hits_by_strategy.values() {
            for hit in hits {
                chunk_info
                    .entry(hit.chunk_id.clone())
                    .or_insert_with(|| (hit.file_path.clone(), hit.symbol_id.clone().unwrap_or_default()));
            }
        }

        for (chunk_id, score) in base_scores.iter_mut() {
            let Some((file_path, symbol_id)) = chunk_info.get(chunk_id) else { continue };
            let matched = expansions.symbols.iter().any(|s| symbol_id.to_lowercase().contains(&s.to_lowercase()))
                || expansions.file_paths.iter().any(|p| file_path.to_lowercase().contains(&p.to_lowercase()))
                || expansions.modules.iter().any(|m| file_path.to_lowercase().contains(&m.to_lowercase()));
            if matched {
                *score *= EXPANSION_BOOST_FACTOR;
            }
        }
    }

    /// §4.13 step 4: consensus factor rewards chunks appearing across more
    /// strategies and ranking well in at least one of them.
    fn apply_consensus_boost(
        &self,
        base_scores: &HashMap<String, f64>,
        hits_by_strategy: &HashMap<String, Vec<RankedHit>>,
    ) -> (HashMap<String, f64>, HashMap<String, ConsensusStats>) {
        let mut ranks_by_chunk: HashMap<String, Vec<usize>> = HashMap::new();
        for hits in hits_by_strategy.values() {
            for hit in hits {
                ranks_by_chunk.entry(hit.chunk_id.clone()).or_default().push(hit.rank);
            }
        }

        let mut final_scores = HashMap::new();
        let mut stats = HashMap::new();
        for (chunk_id, score) in base_scores {
            let ranks = ranks_by_chunk.get(chunk_id).cloned().unwrap_or_default();
            let num_strategies = ranks.len().max(1);
            let best_rank = ranks.iter().copied().min().unwrap_or(usize::MAX);
            let avg_rank = if ranks.is_empty() { f64::MAX } else { ranks.iter().sum::<usize>() as f64 / ranks.len() as f64 };

            // More strategies agreeing, and a better best-rank, raise the
            // factor; diminishing returns per additional strategy.
            let strategy_bonus = 1.0 + (num_strategies.saturating_sub(1) as f64).sqrt() * 0.15;
            let rank_bonus = 1.0 + 1.0 / (1.0 + best_rank as f64);
            let consensus_factor = strategy_bonus * rank_bonus;

            final_scores.insert(chunk_id.clone(), score * consensus_factor);
            stats.insert(chunk_id.clone(), ConsensusStats { num_strategies, best_rank, avg_rank, consensus_factor });
        }
        (final_scores, stats)
    }

    /// §4.13 step 5: per-chunk feature vector for downstream LTR consumers.
    fn generate_feature_vectors(
        &self,
        hits_by_strategy: &HashMap<String, Vec<RankedHit>>,
        rrf_scores: &HashMap<String, HashMap<String, f64>>,
        weights: &WeightProfile,
        consensus_stats: &HashMap<String, ConsensusStats>,
        metadata: &HashMap<String, ChunkMetadata>,
    ) -> HashMap<String, FeatureVector> {
        let mut ranks_by_chunk: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (strategy, hits) in hits_by_strategy {
            for hit in hits {
                ranks_by_chunk.entry(hit.chunk_id.clone()).or_default().insert(strategy.clone(), hit.rank);
            }
        }

        let mut vectors = HashMap::new();
        for (chunk_id, ranks) in &ranks_by_chunk {
            let rrf = rrf_scores.get(chunk_id).cloned().unwrap_or_default();
            let meta = metadata.get(chunk_id);
            let stats = consensus_stats.get(chunk_id).copied().unwrap_or(ConsensusStats {
                num_strategies: 0,
                best_rank: usize::MAX,
                avg_rank: f64::MAX,
                consensus_factor: 1.0,
            });

            let strategy_contrib = |name: &str, weight: f64| StrategyContribution {
                rank: ranks.get(name).copied(),
                rrf_score: rrf.get(name).copied().unwrap_or(0.0),
                weight,
            };

            let file_path = hits_by_strategy.values().flatten().find(|h| &h.chunk_id == chunk_id).map(|h| h.file_path.clone());
            let file_depth = file_path.as_deref().map(|p| p.matches('/').count()).unwrap_or(0);

            vectors.insert(
                chunk_id.clone(),
                FeatureVector {
                    chunk_id: chunk_id.clone(),
                    vec: strategy_contrib("vector", weights.vec),
                    lex: strategy_contrib("lexical", weights.lex),
                    sym: strategy_contrib("symbol", weights.sym),
                    graph: strategy_contrib("graph", weights.graph),
                    num_strategies: stats.num_strategies,
                    best_rank: stats.best_rank,
                    avg_rank: stats.avg_rank,
                    consensus_factor: stats.consensus_factor,
                    chunk_size: meta.map(|m| m.chunk_size).unwrap_or(0),
                    file_depth,
                    symbol_type: meta.map(|m| m.symbol_type.clone()).unwrap_or_default(),
                },
            );
        }
        vectors
    }

    fn consensus_explanation(stats: &ConsensusStats) -> String {
        format!(
            "agreed by {} strateg{} (best_rank={}, factor={:.2})",
            stats.num_strategies,
            if stats.num_strategies == 1 { "y" } else { "ies" },
            stats.best_rank,
            stats.consensus_factor
        )
    }

    /// Runs the full pipeline. `explain` toggles step 7.
    pub fn fuse(
        &self,
        hits_by_strategy: HashMap<String, Vec<RankedHit>>,
        intent_prob: IntentProbability,
        metadata: &HashMap<String, ChunkMetadata>,
        expansions: Option<&QueryExpansions>,
        explain: bool,
    ) -> Vec<FusedResultV3> {
        let weights = self.calculate_intent_weights(&intent_prob);
        let (mut base_scores, rrf_scores) = self.rrf_normalize(&hits_by_strategy, &weights);

        if let Some(expansions) = expansions {
            self.apply_expansion_boost(&mut base_scores, &hits_by_strategy, expansions);
        }

        let (final_scores, consensus_stats) = self.apply_consensus_boost(&base_scores, &hits_by_strategy);
        let feature_vectors = self.generate_feature_vectors(&hits_by_strategy, &rrf_scores, &weights, &consensus_stats, metadata);

        let mut results: Vec<FusedResultV3> = final_scores
            .into_iter()
            .map(|(chunk_id, final_score)| {
                let file_path = hits_by_strategy.values().flatten().find(|h| h.chunk_id == chunk_id).map(|h| h.file_path.clone());
                let symbol_id = hits_by_strategy.values().flatten().find(|h| h.chunk_id == chunk_id).and_then(|h| h.symbol_id.clone());
                FusedResultV3 {
                    chunk_id: chunk_id.clone(),
                    file_path,
                    symbol_id,
                    final_score,
                    feature_vector: feature_vectors[&chunk_id].clone(),
                    consensus_stats: consensus_stats[&chunk_id],
                    explanation: None,
                }
            })
            .collect();

        results.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));

        if explain {
            let dominant = intent_prob.dominant_intent();
            let dominant_prob = intent_prob.to_map().get(dominant).copied().unwrap_or(0.0);
            for result in &mut results {
                let consensus_exp = Self::consensus_explanation(&result.consensus_stats);
                result.explanation =
                    Some(format!("Intent: {dominant} ({dominant_prob:.2}) | {consensus_exp} | final_score={:.4}", result.final_score));
            }
        }

        results
    }

    /// §4.13 step 8: top-K cutoff selected by dominant intent.
    pub fn apply_cutoff(&self, results: Vec<FusedResultV3>, intent_prob: &IntentProbability, cutoff: &crate::config::CutoffConfig) -> Vec<FusedResultV3> {
        let k = match intent_prob.dominant_intent() {
            "symbol" => cutoff.symbol,
            "flow" => cutoff.flow,
            "concept" => cutoff.concept,
            "code" => cutoff.code,
            _ => cutoff.balanced,
        };
        results.into_iter().take(k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(chunk_id: &str, rank: usize) -> RankedHit {
        RankedHit { chunk_id: chunk_id.into(), file_path: format!("{chunk_id}.rs"), symbol_id: None, rank, metadata: HashMap::new() }
    }

    #[test]
    fn flow_intent_boosts_graph_strategy_results_to_top() {
        let engine = FusionEngine::new(60.0);
        let mut hits = HashMap::new();
        hits.insert("graph".to_string(), vec![hit("a", 1)]);
        hits.insert("lexical".to_string(), vec![hit("b", 1)]);

        let intent = IntentProbability { flow: 0.8, ..Default::default() };
        let results = engine.fuse(hits, intent, &HashMap::new(), None, false);
        assert_eq!(results[0].chunk_id, "a");
    }

    #[test]
    fn chunk_in_multiple_strategies_outranks_single_strategy_hit() {
        let engine = FusionEngine::new(60.0);
        let mut hits = HashMap::new();
        hits.insert("vector".to_string(), vec![hit("consensus", 3), hit("solo", 1)]);
        hits.insert("lexical".to_string(), vec![hit("consensus", 2)]);

        let intent = IntentProbability { balanced: 1.0, ..Default::default() };
        let results = engine.fuse(hits, intent, &HashMap::new(), None, false);
        let consensus_result = results.iter().find(|r| r.chunk_id == "consensus").unwrap();
        assert!(consensus_result.feature_vector.num_strategies >= 2);
        assert_eq!(results[0].chunk_id, "consensus");
    }

    #[test]
    fn expansion_match_boosts_score() {
        let engine = FusionEngine::new(60.0);
        let mut hits = HashMap::new();
        hits.insert("vector".to_string(), vec![hit("a", 1), hit("b", 1)]);

        let intent = IntentProbability { balanced: 1.0, ..Default::default() };
        let without_boost = engine.fuse(hits.clone(), intent, &HashMap::new(), None, false);
        let score_a_before = without_boost.iter().find(|r| r.chunk_id == "a").unwrap().final_score;

        let expansions = QueryExpansions { file_paths: vec!["a.rs".into()], ..Default::default() };
        let with_boost = engine.fuse(hits, intent, &HashMap::new(), Some(&expansions), false);
        let score_a_after = with_boost.iter().find(|r| r.chunk_id == "a").unwrap().final_score;

        assert!(score_a_after > score_a_before);
    }

    #[test]
    fn explanations_populate_when_requested() {
        let engine = FusionEngine::new(60.0);
        let mut hits = HashMap::new();
        hits.insert("symbol".to_string(), vec![hit("a", 1)]);
        let intent = IntentProbability { symbol: 0.9, ..Default::default() };
        let results = engine.fuse(hits, intent, &HashMap::new(), None, true);
        assert!(results[0].explanation.is_some());
        assert!(results[0].explanation.as_ref().unwrap().contains("Intent: symbol (0.90)"));
    }

    #[test]
    fn cutoff_respects_dominant_intent_k() {
        let engine = FusionEngine::new(60.0);
        let mut hits = HashMap::new();
        hits.insert("symbol".to_string(), (1..=30).map(|r| hit(&format!("c{r}"), r)).collect());
        let intent = IntentProbability { symbol: 0.9, ..Default::default() };
        let results = engine.fuse(hits, intent, &HashMap::new(), None, false);
        let mut cutoff = crate::config::CutoffConfig::default();
        cutoff.symbol = 5;
        let cut = engine.apply_cutoff(results, &intent, &cutoff);
        assert_eq!(cut.len(), 5);
    }
}
