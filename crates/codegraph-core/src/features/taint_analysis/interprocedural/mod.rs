pub mod alias;
pub mod analyzer;
pub mod context;

pub use alias::{AliasAnalyzer, AliasCertainty};
pub use analyzer::{DeepAnalyzer, FlowExpr, PathResult, ProjectContext, GLOBAL_SCOPE};
pub use context::{CallContext, ContextManager};
