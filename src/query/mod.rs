//! Query Layer - enrichment over a populated store

pub mod engine;

pub use engine::{EnrichmentEngine, EnrichmentRecord};
