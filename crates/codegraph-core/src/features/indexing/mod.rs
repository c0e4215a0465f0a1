pub mod incremental;
pub mod symbol_search;

pub use incremental::{ChangeSet, FileMetadata, IncrementalIndexer, IndexingStats, ObservedFile};
pub use symbol_search::SymbolSearchLayer;
