pub mod id_strategy;

pub use id_strategy::{content_hash, IdStrategy};
