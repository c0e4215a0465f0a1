//! Edge: relations between Nodes (containment, calls, data flow, imports).

use std::fmt;

use super::attrs::Attrs;
use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contains,
    Calls,
    Reads,
    Writes,
    Inherits,
    Imports,
    References,
    Defines,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Contains => "contains",
            EdgeKind::Calls => "calls",
            EdgeKind::Reads => "reads",
            EdgeKind::Writes => "writes",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Imports => "imports",
            EdgeKind::References => "references",
            EdgeKind::Defines => "defines",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    pub id: String,
    pub kind: EdgeKind,
    pub source_id: String,
    pub target_id: String,
    pub span: Option<Span>,
    pub attrs: Attrs,
}

impl Edge {
    pub fn new(id: impl Into<String>, kind: EdgeKind, source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source_id: source_id.into(),
            target_id: target_id.into(),
            span: None,
            attrs: Attrs::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}
