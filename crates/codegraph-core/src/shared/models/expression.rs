//! Expression IR: one entry per statement/sub-expression inside a block.

use super::attrs::Attrs;
use super::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnaryOp {
    Not,
    Neg,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    Bool,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    List,
    Set,
    Dict,
    Tuple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Attribute,
    Subscript,
    Slice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExprKind {
    Call,
    NameLoad,
    Assign,
    Literal,
    BinOp,
    UnaryOp,
    Compare,
    BoolOp,
    ForLoop,
    WhileLoop,
    Return,
    Collection,
    Access,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TypeInfo {
    pub raw: Option<String>,
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HeapAccess {
    pub collection_var_id: String,
    pub element_key: Option<String>,
}

/// A single statement/sub-expression emitted during semantic IR build.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Expression {
    pub id: String,
    pub kind: ExprKind,
    pub repo_id: String,
    pub file_path: String,
    pub function_fqn: Option<String>,
    pub span: Span,
    pub block_id: Option<String>,
    pub reads_vars: Vec<String>,
    pub defines_var: Option<String>,
    pub attrs: Attrs,
    pub inferred_type: Option<TypeInfo>,
    pub inferred_type_id: Option<String>,
    pub symbol_id: Option<String>,
    pub symbol_fqn: Option<String>,
}

impl Expression {
    pub fn new(id: impl Into<String>, kind: ExprKind, repo_id: impl Into<String>, file_path: impl Into<String>, span: Span) -> Self {
        Self {
            id: id.into(),
            kind,
            repo_id: repo_id.into(),
            file_path: file_path.into(),
            function_fqn: None,
            span,
            block_id: None,
            reads_vars: Vec::new(),
            defines_var: None,
            attrs: Attrs::new(),
            inferred_type: None,
            inferred_type_id: None,
            symbol_id: None,
            symbol_fqn: None,
        }
    }

    pub fn callee_name(&self) -> Option<&str> {
        self.attrs.get_str("callee_name")
    }

    pub fn var_name(&self) -> Option<&str> {
        self.attrs.get_str("var_name")
    }

    pub fn arg_expr_ids(&self) -> Vec<String> {
        self.attrs
            .get_list("arg_expr_ids")
            .map(|l| {
                l.iter()
                    .filter_map(|v| match v {
                        super::attrs::AttrValue::Str(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Monotonic expression-ID counter, reset per build session (§4.4).
#[derive(Debug, Default)]
pub struct ExpressionIdCounter {
    counter: u64,
}

impl ExpressionIdCounter {
    pub fn next(&mut self, repo_id: &str, file_path: &str, line: u32, col: u32) -> String {
        let id = crate::shared::utils::id_strategy::IdStrategy::expression_id(repo_id, file_path, line, col, self.counter);
        self.counter += 1;
        id
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
