pub mod compiler;
pub mod domain;
pub mod entity;
pub mod executor;
pub mod interprocedural;
pub mod multi_index;
pub mod trigram;

pub use compiler::{RuleSpec, TaintRuleCompiler};
pub use domain::{
    Atom, AtomKind, CompiledRule, DetectedSink, DetectedSource, Effect, GeneratorKind, Match, MatchRule, Prefilter, Predicate, Severity,
    TaintFlow, TraceInfo, Vulnerability,
};
pub use entity::Entity;
pub use executor::{ExecutorStats, TaintRuleExecutor};
pub use multi_index::MultiIndex;
