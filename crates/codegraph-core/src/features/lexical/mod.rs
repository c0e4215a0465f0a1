pub mod fusion_engine;
pub mod models;

pub use fusion_engine::{ChunkMetadata, FusionEngine, QueryExpansions};
pub use models::{
    ConsensusStats, FeatureVector, FusedResultV3, IntentProbability, IntentWeights, RankedHit, StrategyContribution, WeightProfile,
};
