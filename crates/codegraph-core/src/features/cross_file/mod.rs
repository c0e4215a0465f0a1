pub mod resolver;

pub use resolver::{CrossFileResolver, FileUnit, ResolvedImport, SymbolEntry};
