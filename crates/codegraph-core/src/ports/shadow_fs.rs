//! Shadow filesystem port (§6.2): an in-memory overlay over a workspace,
//! grounded on the `GitManager` branch/commit/rollback shape but
//! collapsed to one trait since the VCS backing store is an external
//! collaborator here.

use crate::errors::CoreResult;

#[derive(Debug, Clone)]
pub struct ShadowFsState {
    pub branch: String,
    pub dirty_files: Vec<String>,
}

pub trait ShadowFs: Send + Sync {
    fn read_file(&self, path: &str) -> CoreResult<Vec<u8>>;
    fn write_file(&self, path: &str, content: &[u8]) -> CoreResult<()>;
    fn get_diff(&self, path: Option<&str>) -> CoreResult<String>;
    fn commit(&self, message: &str) -> CoreResult<String>;
    fn rollback(&self, commit_hash: &str) -> CoreResult<()>;
    fn get_state(&self) -> CoreResult<ShadowFsState>;
}
