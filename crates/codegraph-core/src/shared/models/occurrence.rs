//! Occurrence: a concrete appearance of a symbol at a span, with a role set.

use std::collections::BTreeSet;
use std::fmt;

use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolRole {
    Definition,
    Reference,
    Read,
    Write,
}

impl fmt::Display for SymbolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolRole::Definition => "DEFINITION",
            SymbolRole::Reference => "REFERENCE",
            SymbolRole::Read => "READ",
            SymbolRole::Write => "WRITE",
        };
        f.write_str(s)
    }
}

/// An ordered, deduplicated set of [`SymbolRole`]s.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SymbolRoles(pub BTreeSet<SymbolRole>);

impl SymbolRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(roles: impl IntoIterator<Item = SymbolRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn contains(&self, role: SymbolRole) -> bool {
        self.0.contains(&role)
    }

    pub fn is_definition(&self) -> bool {
        self.contains(SymbolRole::Definition)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub symbol_id: String,
    pub file_path: String,
    pub span: Span,
    pub roles: SymbolRoles,
    pub importance_score: f64,
}

impl Occurrence {
    pub fn new(id: impl Into<String>, symbol_id: impl Into<String>, file_path: impl Into<String>, span: Span, roles: SymbolRoles) -> Self {
        let importance_score = if roles.is_definition() { 1.0 } else { 0.5 };
        Self {
            id: id.into(),
            symbol_id: symbol_id.into(),
            file_path: file_path.into(),
            span,
            roles,
            importance_score,
        }
    }

    pub fn with_importance(mut self, score: f64) -> Self {
        self.importance_score = score.clamp(0.0, 1.0);
        self
    }
}

/// Monotonic generator for `occ:{n}` occurrence IDs, reset per build session.
#[derive(Debug, Default)]
pub struct OccurrenceGenerator {
    counter: u64,
}

impl OccurrenceGenerator {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let id = crate::shared::utils::id_strategy::IdStrategy::occurrence_id(self.counter);
        self.counter += 1;
        id
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
