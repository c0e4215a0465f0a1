//! Alias analysis over WRITES/READS edges: builds `variable -> {aliases}`
//! with may/must distinction (§4.11).

use std::collections::{HashMap, HashSet};

use crate::shared::models::{Edge, EdgeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasCertainty {
    May,
    Must,
}

#[derive(Debug, Default)]
pub struct AliasAnalyzer {
    /// variable_id -> (aliased_variable_id -> certainty)
    aliases: HashMap<String, HashMap<String, AliasCertainty>>,
}

impl AliasAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds direct aliases from simple `x = y` assignment patterns,
    /// modeled here as `WRITES` edges where `source_id` reads from
    /// `target_id` in the same statement (attrs.aliases_var carries the
    /// other side). Field/element aliasing (`x.field = y`, `x[i] = y`) is
    /// treated as `May`; direct aliasing (`x = y`) as `Must`.
    pub fn build(&mut self, edges: &[Edge]) {
        self.aliases.clear();
        for edge in edges {
            if edge.kind != EdgeKind::Writes {
                continue;
            }
            let Some(other) = edge.attrs.get_str("aliases_var") else { continue };
            let access_kind = edge.attrs.get_str("access_kind").unwrap_or("direct");
            let certainty = if access_kind == "direct" { AliasCertainty::Must } else { AliasCertainty::May };
            self.aliases.entry(edge.target_id.clone()).or_default().insert(other.to_string(), certainty);
            self.aliases.entry(other.to_string()).or_default().insert(edge.target_id.clone(), certainty);
        }
    }

    pub fn may_alias(&self, a: &str, b: &str) -> bool {
        self.aliases.get(a).map(|m| m.contains_key(b)).unwrap_or(false)
    }

    pub fn must_alias(&self, a: &str, b: &str) -> bool {
        self.aliases.get(a).and_then(|m| m.get(b)).map(|c| *c == AliasCertainty::Must).unwrap_or(false)
    }

    pub fn aliases_of(&self, var: &str) -> HashSet<String> {
        self.aliases.get(var).map(|m| m.keys().cloned().collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Attrs;

    fn writes_edge(target: &str, aliases_var: &str, access_kind: &str) -> Edge {
        let mut e = Edge::new("e1", EdgeKind::Writes, "src", target);
        e.attrs = {
            let mut a = Attrs::new();
            a.set("aliases_var", aliases_var);
            a.set("access_kind", access_kind);
            a
        };
        e
    }

    #[test]
    fn direct_assignment_is_must_alias() {
        let mut analyzer = AliasAnalyzer::new();
        analyzer.build(&[writes_edge("x", "y", "direct")]);
        assert!(analyzer.must_alias("x", "y"));
        assert!(analyzer.may_alias("y", "x"));
    }

    #[test]
    fn field_assignment_is_may_alias_only() {
        let mut analyzer = AliasAnalyzer::new();
        analyzer.build(&[writes_edge("x", "y", "field")]);
        assert!(analyzer.may_alias("x", "y"));
        assert!(!analyzer.must_alias("x", "y"));
    }
}
