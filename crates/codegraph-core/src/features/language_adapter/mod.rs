//! Language Adapter (§4.3): converts a parsed syntax tree into per-file IR
//! (nodes, edges, occurrences, expressions). One adapter instance handles
//! one file; the external-function cache is repo-scoped and meant to be
//! reused across files from the same repo.

mod adapter;
mod builtins;

pub use adapter::{AdapterOutput, LanguageAdapter};
