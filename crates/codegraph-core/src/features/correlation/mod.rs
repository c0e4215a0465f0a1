pub mod cochange;
pub mod index;
pub mod models;

pub use cochange::CoChangeAnalyzer;
pub use index::CorrelationIndex;
pub use models::{CorrelationEntry, CorrelationType};
