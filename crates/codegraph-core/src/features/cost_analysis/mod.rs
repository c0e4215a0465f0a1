pub mod domain;
pub mod infrastructure;

pub use domain::{BoundResult, ComplexityClass, CostResult, Hotspot, InferenceMethod, Verdict};
pub use infrastructure::analyzer::{extract_range_bound, CostAnalyzer};
