//! Crate-wide error taxonomy (§7).
//!
//! `ValidationError`/`NotFoundError`/`ResourceError`/`SchemaError` are
//! surfaced to the caller as [`CoreError`] variants. `TimeoutError` and
//! `ExternalError` are recovered locally at the call site (returning
//! `None`/empty collections with a `tracing::warn!`) and never reach this
//! enum except when no fallback exists.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("resource exhausted: {resource} (limit {limit})")]
    ResourceExhausted { resource: String, limit: usize },

    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("external collaborator failed with no fallback: {message}")]
    External { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation { message: message.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound { what: what.into() }
    }

    pub fn resource_exhausted(resource: impl Into<String>, limit: usize) -> Self {
        CoreError::ResourceExhausted { resource: resource.into(), limit }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        CoreError::Schema { message: message.into() }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
