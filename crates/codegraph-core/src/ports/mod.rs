pub mod cache_store;
pub mod diagnostics;
pub mod envelope;
pub mod lsp;
pub mod shadow_fs;
pub mod storage;
pub mod syntax_tree;

pub use cache_store::CacheStorePort;
pub use diagnostics::{DiagnosticsSubscriberPort, PublishedDiagnostic};
pub use envelope::{Claim, ConfidenceBasis, Evidence, Provenance, ResultEnvelope, Severity};
pub use lsp::{DiagnosticSeverityLevel, Location, LspDiagnostic, LspPort, TypeInfo};
pub use shadow_fs::ShadowFs;
pub use storage::{CorrelationStoragePort, DocumentStoragePort, FeedbackStoragePort};
pub use syntax_tree::{AstNode, SyntaxTree, SyntaxTreePort};
