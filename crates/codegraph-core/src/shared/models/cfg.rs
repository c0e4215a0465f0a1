//! Control-flow graph: basic blocks and the edges connecting them.

use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Entry,
    Exit,
    Block,
    LoopHeader,
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfgEdgeKind {
    Normal,
    TrueBranch,
    FalseBranch,
    LoopBack,
    Exception,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CfgBlock {
    pub id: String,
    pub kind: BlockKind,
    pub function_node_id: String,
    pub span: Span,
    pub statement_count: u32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CfgEdge {
    pub source_block_id: String,
    pub target_block_id: String,
    pub kind: CfgEdgeKind,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BasicFlowGraph {
    pub id: String,
    pub function_node_id: String,
    pub entry_block_id: String,
    pub exit_block_id: String,
    pub blocks: Vec<String>,
    pub total_statements: u32,
}

impl BasicFlowGraph {
    /// The entry and exit blocks must be members of `blocks` (§3.3 invariant).
    pub fn is_valid(&self) -> bool {
        self.blocks.contains(&self.entry_block_id) && self.blocks.contains(&self.exit_block_id)
    }
}
