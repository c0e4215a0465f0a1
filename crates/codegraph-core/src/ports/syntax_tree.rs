//! Syntax tree port (§6.2, driven port): infrastructure supplies a
//! tree-sitter-equivalent parser; the core only consumes this interface.

use crate::shared::models::Span;

pub trait AstNode {
    fn kind(&self) -> &str;
    fn span(&self) -> Span;
    fn child_by_field_name(&self, field: &str) -> Option<Box<dyn AstNode>>;
    fn children(&self) -> Vec<Box<dyn AstNode>>;
    fn byte_range(&self) -> (usize, usize);
}

pub trait SyntaxTree {
    fn root_node(&self) -> Box<dyn AstNode>;
    fn source_bytes(&self) -> &[u8];
}

pub trait SyntaxTreePort: Send + Sync {
    fn parse(&self, source_file: &str, content: &[u8]) -> Result<Box<dyn SyntaxTree>, String>;
}
