pub mod cache;
pub mod correlation;
pub mod cost_analysis;
pub mod cross_file;
pub mod indexing;
pub mod ir_builder;
pub mod language_adapter;
pub mod lexical;
pub mod taint_analysis;
