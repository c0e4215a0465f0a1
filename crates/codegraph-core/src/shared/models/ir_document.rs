//! The per-file (or per-repo) IR container produced by a build pipeline.

use std::collections::BTreeMap;

use super::cfg::{BasicFlowGraph, CfgBlock, CfgEdge};
use super::edge::Edge;
use super::expression::Expression;
use super::node::Node;
use super::occurrence::Occurrence;
use super::type_entities::{InterproceduralDataFlowEdge, TypeEntity};

/// Empty-document base size, per §3.6 / §8 boundary test.
pub const EMPTY_DOCUMENT_SIZE: u64 = 2000;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct IrDocument {
    pub repo_id: String,
    pub snapshot_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub occurrences: Vec<Occurrence>,
    pub cfg_blocks: Vec<CfgBlock>,
    pub cfg_edges: Vec<CfgEdge>,
    pub bfg_graphs: Vec<BasicFlowGraph>,
    pub dfg_edges: Vec<InterproceduralDataFlowEdge>,
    pub expressions: Vec<Expression>,
    pub type_entities: Vec<TypeEntity>,
    pub meta: BTreeMap<String, String>,
}

impl IrDocument {
    pub fn new(repo_id: impl Into<String>, snapshot_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            snapshot_id: snapshot_id.into(),
            ..Default::default()
        }
    }

    /// `2000 + 200*|nodes| + 100*|edges| + 50*|occurrences| + other-IR-sizes`
    /// (§3.6). Other IR collections are weighted at 80 bytes/entry, a
    /// reasonable estimate in the absence of a named per-kind weight.
    pub fn estimated_size(&self) -> u64 {
        let base = EMPTY_DOCUMENT_SIZE;
        let nodes = 200 * self.nodes.len() as u64;
        let edges = 100 * self.edges.len() as u64;
        let occs = 50 * self.occurrences.len() as u64;
        let other = 80
            * (self.cfg_blocks.len()
                + self.cfg_edges.len()
                + self.bfg_graphs.len()
                + self.dfg_edges.len()
                + self.expressions.len()
                + self.type_entities.len()) as u64;
        base + nodes + edges + occs + other
    }

    /// Sort every collection by ID so that repeated builds on identical
    /// input serialize bit-identically (§3.3 determinism invariant).
    pub fn canonicalize(&mut self) {
        self.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        self.edges.sort_by(|a, b| a.id.cmp(&b.id));
        self.occurrences.sort_by(|a, b| a.id.cmp(&b.id));
        self.cfg_blocks.sort_by(|a, b| a.id.cmp(&b.id));
        self.bfg_graphs.sort_by(|a, b| a.id.cmp(&b.id));
        self.expressions.sort_by(|a, b| a.id.cmp(&b.id));
        self.type_entities.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_size_is_2000() {
        let doc = IrDocument::new("repo1", "snap1");
        assert_eq!(doc.estimated_size(), EMPTY_DOCUMENT_SIZE);
    }
}
