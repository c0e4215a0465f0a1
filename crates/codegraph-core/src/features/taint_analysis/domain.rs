//! Taint atoms, rules, matches, flows, and vulnerabilities (§3.4).

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    Source,
    Sink,
    Sanitizer,
    Propagator,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MatchRule {
    pub base_type: Option<String>,
    pub call: Option<String>,
    pub read: Option<String>,
    pub scope: Option<String>,
    pub arg_position: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Atom {
    pub id: String,
    pub kind: AtomKind,
    pub rule: MatchRule,
    pub tags: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Candidate-generation strategy, ordered most-specific-first (§3.4).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GeneratorKind {
    ExactTypeCall { base_type: String, call: String },
    ExactCall { call: String },
    CallPrefix { prefix: String },
    TypeSuffix { suffix: String },
    TypeTrigram { literal: String },
    Fallback,
}

impl GeneratorKind {
    /// Lower value = more specific, used to order generator evaluation.
    pub fn specificity_rank(&self) -> u8 {
        match self {
            GeneratorKind::ExactTypeCall { .. } => 0,
            GeneratorKind::ExactCall { .. } => 1,
            GeneratorKind::CallPrefix { .. } => 2,
            GeneratorKind::TypeSuffix { .. } => 3,
            GeneratorKind::TypeTrigram { .. } => 4,
            GeneratorKind::Fallback => 5,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Prefilter {
    pub call_starts_with: Option<String>,
    pub type_ends_with: Option<String>,
    pub has_arg_index: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Predicate {
    pub name: String,
    pub confidence_adjustment: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Effect {
    pub kind: AtomKind,
    pub taint_arg_positions: Vec<usize>,
    pub vulnerability_policy_id: Option<String>,
}

/// A compiled, executable rule, sorted by specificity (§3.4, §4.9).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompiledRule {
    pub rule_id: String,
    pub atom_id: String,
    pub specificity_score: f64,
    pub tier: u8,
    pub generators: Vec<GeneratorKind>,
    pub prefilters: Vec<Prefilter>,
    pub predicates: Vec<Predicate>,
    pub confidence_base: f64,
    pub report_threshold: f64,
    pub effect: Effect,
}

impl CompiledRule {
    pub fn should_report(&self, confidence: f64) -> bool {
        confidence >= self.report_threshold
    }
}

impl PartialEq for CompiledRule {
    fn eq(&self, other: &Self) -> bool {
        self.rule_id == other.rule_id
    }
}
impl Eq for CompiledRule {}

impl PartialOrd for CompiledRule {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompiledRule {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Highest specificity first.
        other
            .specificity_score
            .partial_cmp(&self.specificity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DetectedSource {
    pub atom_id: String,
    pub file_path: String,
    pub line: u32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DetectedSink {
    pub atom_id: String,
    pub file_path: String,
    pub line: u32,
    pub matched_arg_indices: Vec<usize>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaintFlow {
    pub nodes: Vec<String>,
    pub has_sanitizer: bool,
    pub confidence: f64,
}

impl TaintFlow {
    pub fn new(nodes: Vec<String>, has_sanitizer: bool, confidence: f64) -> Self {
        Self { nodes, has_sanitizer, confidence }
    }

    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Vulnerability {
    pub id: Uuid,
    pub policy_id: String,
    pub policy_name: String,
    pub severity: Severity,
    pub source: DetectedSource,
    pub sink: DetectedSink,
    pub flow: TaintFlow,
    pub confidence: f64,
    pub cwe: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Vulnerability {
    pub fn get_file_path(&self) -> &str {
        &self.source.file_path
    }

    pub fn get_line(&self) -> u32 {
        self.source.line
    }

    pub fn cwe_is_valid(&self) -> bool {
        match &self.cwe {
            None => true,
            Some(s) => s.starts_with("CWE-") && s["CWE-".len()..].chars().all(|c| c.is_ascii_digit()) && s.len() > "CWE-".len(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TraceInfo {
    pub generator_used: String,
    pub prefilters_passed: usize,
    pub predicates_evaluated: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Match {
    pub rule_id: String,
    pub atom_id: String,
    pub entity_id: String,
    pub confidence: f64,
    pub specificity: f64,
    pub effect_kind: AtomKind,
    pub taint_positions: Vec<usize>,
    pub tier: u8,
    pub severity: Severity,
    pub tags: Vec<String>,
    pub trace: Option<TraceInfo>,
}
