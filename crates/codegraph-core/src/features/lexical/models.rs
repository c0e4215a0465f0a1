//! Retrieval Fusion Engine types (§4.13).

use std::collections::HashMap;

/// A single strategy's hit for a chunk, pre-fusion.
#[derive(Debug, Clone)]
pub struct RankedHit {
    pub chunk_id: String,
    pub file_path: String,
    pub symbol_id: Option<String>,
    pub rank: usize,
    pub metadata: HashMap<String, String>,
}

/// Multi-label intent distribution. Not required to sum to 1 on input;
/// fusion re-normalizes its own derived weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentProbability {
    pub symbol: f64,
    pub flow: f64,
    pub concept: f64,
    pub code: f64,
    pub balanced: f64,
}

impl IntentProbability {
    pub fn to_map(&self) -> HashMap<&'static str, f64> {
        HashMap::from([
            ("symbol", self.symbol),
            ("flow", self.flow),
            ("concept", self.concept),
            ("code", self.code),
            ("balanced", self.balanced),
        ])
    }

    /// Highest-probability label; ties favor the order symbol > flow >
    /// concept > code > balanced, matching the teacher's dict-iteration
    /// tie-break in practice.
    pub fn dominant_intent(&self) -> &'static str {
        let candidates = [
            ("symbol", self.symbol),
            ("flow", self.flow),
            ("concept", self.concept),
            ("code", self.code),
            ("balanced", self.balanced),
        ];
        candidates
            .into_iter()
            .fold(("balanced", f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best })
            .0
    }
}

/// Per-intent weighting over the four retrieval strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightProfile {
    pub vec: f64,
    pub lex: f64,
    pub sym: f64,
    pub graph: f64,
}

impl WeightProfile {
    pub fn new(vec: f64, lex: f64, sym: f64, graph: f64) -> Self {
        Self { vec, lex, sym, graph }
    }
}

/// The five named per-intent weight profiles (§4.13 step 1).
#[derive(Debug, Clone)]
pub struct IntentWeights {
    pub symbol: WeightProfile,
    pub flow: WeightProfile,
    pub concept: WeightProfile,
    pub code: WeightProfile,
    pub balanced: WeightProfile,
}

impl Default for IntentWeights {
    fn default() -> Self {
        Self {
            symbol: WeightProfile::new(0.1, 0.2, 0.6, 0.1),
            flow: WeightProfile::new(0.1, 0.1, 0.2, 0.6),
            concept: WeightProfile::new(0.6, 0.3, 0.05, 0.05),
            code: WeightProfile::new(0.4, 0.4, 0.1, 0.1),
            balanced: WeightProfile::new(0.25, 0.25, 0.25, 0.25),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConsensusStats {
    pub num_strategies: usize,
    pub best_rank: usize,
    pub avg_rank: f64,
    pub consensus_factor: f64,
}

/// One strategy's contribution to a chunk's fused score.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyContribution {
    pub rank: Option<usize>,
    pub rrf_score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub chunk_id: String,
    pub vec: StrategyContribution,
    pub lex: StrategyContribution,
    pub sym: StrategyContribution,
    pub graph: StrategyContribution,
    pub num_strategies: usize,
    pub best_rank: usize,
    pub avg_rank: f64,
    pub consensus_factor: f64,
    pub chunk_size: usize,
    pub file_depth: usize,
    pub symbol_type: String,
}

#[derive(Debug, Clone)]
pub struct FusedResultV3 {
    pub chunk_id: String,
    pub file_path: Option<String>,
    pub symbol_id: Option<String>,
    pub final_score: f64,
    pub feature_vector: FeatureVector,
    pub consensus_stats: ConsensusStats,
    pub explanation: Option<String>,
}
