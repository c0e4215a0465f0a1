pub mod attrs;
pub mod cfg;
pub mod edge;
pub mod expression;
pub mod ir_document;
pub mod node;
pub mod occurrence;
pub mod span;
pub mod type_entities;

pub use attrs::{AttrValue, Attrs};
pub use cfg::{BasicFlowGraph, BlockKind, CfgBlock, CfgEdge, CfgEdgeKind};
pub use edge::{Edge, EdgeKind};
pub use expression::{Expression, ExpressionIdCounter, ExprKind, TypeInfo};
pub use ir_document::IrDocument;
pub use node::{Node, NodeKind};
pub use occurrence::{Occurrence, OccurrenceGenerator, SymbolRole, SymbolRoles};
pub use span::{Location, Span, SpanPool, SpanPoolStats};
pub use type_entities::{IdfgEdgeKind, InterproceduralDataFlowEdge, ResolutionLevel, TypeEntity, TypeFlavor, VariableEntity};
