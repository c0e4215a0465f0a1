//! Correlation Index types (§4.15).

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationType {
    CoChange,
    CoOccurrence,
    CoSearch,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CorrelationEntry {
    pub source_id: String,
    pub target_id: String,
    pub correlation_type: CorrelationType,
    pub strength: f64,
    pub count: u64,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CorrelationSearchResult {
    pub entity_id: String,
    pub correlation_type: CorrelationType,
    pub strength: f64,
    pub count: u64,
    pub metadata: BTreeMap<String, String>,
}
