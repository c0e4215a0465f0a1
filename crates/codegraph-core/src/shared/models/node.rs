//! Node: the IR's syntactic entity (file, class, function, method,
//! variable, import).

use std::fmt;
use std::str::FromStr;

use super::attrs::Attrs;
use super::span::Span;

/// Canonical, lowercase-snake_case node kinds (§9: the source mixed
/// `"function"`/`"Function"` in different paths; this crate enforces one
/// form at ingestion via [`NodeKind::FromStr`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Class,
    Function,
    Method,
    Variable,
    Import,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::File => "file",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Variable => "variable",
            NodeKind::Import => "import",
        };
        f.write_str(s)
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(NodeKind::File),
            "class" => Ok(NodeKind::Class),
            "function" => Ok(NodeKind::Function),
            "method" => Ok(NodeKind::Method),
            "variable" => Ok(NodeKind::Variable),
            "import" => Ok(NodeKind::Import),
            other => Err(format!("unknown node kind: {other}")),
        }
    }
}

/// A syntactic entity produced by a language adapter. Immutable after build.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub fqn: String,
    pub name: String,
    pub file_path: String,
    pub span: Span,
    pub language: String,
    pub parent_id: Option<String>,
    pub docstring: Option<String>,
    pub content_hash: Option<String>,
    pub attrs: Attrs,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, fqn: impl Into<String>, file_path: impl Into<String>) -> Self {
        let fqn = fqn.into();
        let name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();
        Self {
            id: id.into(),
            kind,
            fqn,
            name,
            file_path: file_path.into(),
            span: Span::zero(),
            language: String::new(),
            parent_id: None,
            docstring: None,
            content_hash: None,
            attrs: Attrs::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    pub fn is_external(&self) -> bool {
        self.attrs.get_bool("is_external").unwrap_or(false)
    }
}
