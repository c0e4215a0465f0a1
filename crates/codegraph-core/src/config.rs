//! Operational knobs (§6.4), collected into one deserializable struct.
//! Loading from files/env is out of scope here; callers construct this
//! directly or via `serde` from whatever config layer they own.

use std::path::PathBuf;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CutoffConfig {
    #[serde(default = "default_cutoff")]
    pub symbol: usize,
    #[serde(default = "default_cutoff")]
    pub flow: usize,
    #[serde(default = "default_cutoff")]
    pub concept: usize,
    #[serde(default = "default_cutoff")]
    pub code: usize,
    #[serde(default = "default_cutoff")]
    pub balanced: usize,
}

fn default_cutoff() -> usize {
    20
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            symbol: default_cutoff(),
            flow: default_cutoff(),
            concept: default_cutoff(),
            code: default_cutoff(),
            balanced: default_cutoff(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_span_pool_max_size")]
    pub span_pool_max_size: usize,

    #[serde(default = "default_l1_max_size")]
    pub cache_l1_max_size: usize,
    #[serde(default = "default_l1_max_bytes")]
    pub cache_l1_max_bytes: u64,
    #[serde(default)]
    pub cache_l2_dir: Option<PathBuf>,

    #[serde(default = "default_rrf_k")]
    pub retriever_rrf_k: f64,
    #[serde(default)]
    pub retriever_cutoff: CutoffConfig,

    #[serde(default = "default_max_rules")]
    pub taint_max_rules: usize,
    #[serde(default = "default_taint_cache_size")]
    pub taint_cache_size: usize,
    #[serde(default = "default_max_query_length")]
    pub taint_max_query_length: usize,
    #[serde(default = "default_regex_timeout_ms")]
    pub taint_regex_timeout_ms: u64,

    #[serde(default = "default_true")]
    pub cost_enable_cache: bool,
    #[serde(default = "default_max_nesting_threshold")]
    pub cost_max_nesting_threshold: u32,

    #[serde(default = "default_true")]
    pub incremental_fast_path_enabled: bool,
}

fn default_span_pool_max_size() -> usize {
    100_000
}
fn default_l1_max_size() -> usize {
    10_000
}
fn default_l1_max_bytes() -> u64 {
    256 * 1024 * 1024
}
fn default_rrf_k() -> f64 {
    60.0
}
fn default_max_rules() -> usize {
    100_000
}
fn default_taint_cache_size() -> usize {
    10_000
}
fn default_max_query_length() -> usize {
    10_000
}
fn default_regex_timeout_ms() -> u64 {
    1000
}
fn default_max_nesting_threshold() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            span_pool_max_size: default_span_pool_max_size(),
            cache_l1_max_size: default_l1_max_size(),
            cache_l1_max_bytes: default_l1_max_bytes(),
            cache_l2_dir: None,
            retriever_rrf_k: default_rrf_k(),
            retriever_cutoff: CutoffConfig::default(),
            taint_max_rules: default_max_rules(),
            taint_cache_size: default_taint_cache_size(),
            taint_max_query_length: default_max_query_length(),
            taint_regex_timeout_ms: default_regex_timeout_ms(),
            cost_enable_cache: true,
            cost_max_nesting_threshold: default_max_nesting_threshold(),
            incremental_fast_path_enabled: true,
        }
    }
}
