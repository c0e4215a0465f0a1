//! Polyglot static code-analysis core.
//!
//! Layered content-addressed IR, interprocedural taint analysis, cost
//! analysis, a tiered cache, cross-file resolution, and a retrieval
//! fusion engine. External collaborators (parsers, LSP, storage) are
//! defined as ports only; this crate is not the orchestrator.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod errors;
pub mod features;
pub mod ports;
pub mod shared;

pub use config::CoreConfig;
pub use errors::{CoreError, CoreResult};
