//! Storage adapter ports (§6.2): narrow CRUD contracts for external
//! stores. The core holds only references; connection pooling and
//! persistence are owned by the adapter (§5 shared-resource policy).

use crate::errors::CoreResult;
use crate::features::correlation::CorrelationEntry;
use crate::shared::models::IrDocument;

pub trait DocumentStoragePort: Send + Sync {
    fn put(&self, document: &IrDocument) -> CoreResult<()>;
    fn get(&self, repo_id: &str, snapshot_id: &str) -> CoreResult<Option<IrDocument>>;
    fn full_text_search(&self, repo_id: &str, query: &str, limit: usize) -> CoreResult<Vec<String>>;
}

pub trait CorrelationStoragePort: Send + Sync {
    fn put_all(&self, entries: &[CorrelationEntry]) -> CoreResult<()>;
    fn query(&self, entity_id: &str, limit: usize) -> CoreResult<Vec<CorrelationEntry>>;
}

pub trait FeedbackStoragePort: Send + Sync {
    fn record_feedback(&self, request_id: &str, chunk_id: &str, signal: &str) -> CoreResult<()>;
}
