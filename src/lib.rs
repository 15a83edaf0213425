//! # gmtdb - Pathway gene-set store
//!
//! Loads WikiPathways-style GMT gene-set files into a relational store and
//! answers pathway membership queries.
//!
//! gmtdb provides:
//! - A GMT parser that splits pathway name, species, identifier and revision
//! - Entrez → HGNC identifier reconciliation with explicit handling of misses
//! - SQLite-backed Pathway ↔ Protein membership with get-or-create upserts
//! - Symbol-set enrichment queries and "part-of" annotation graphs

pub mod fetch;
pub mod gmt;
pub mod resolver;
pub mod model;
pub mod storage;
pub mod pipeline;
pub mod edge;
pub mod graph;
pub mod query;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use fetch::{Fetcher, SourceFetcher};
pub use gmt::{GmtRecord, parse_gmt};
pub use resolver::{HgncTable, IdentifierResolver, MappingTables, Resolution};
pub use model::{Pathway, Protein, Species};
pub use storage::SqliteStore;
pub use pipeline::{PopulateStats, PopulationState, Populator, Sources};
pub use edge::{Edge, Relation};
pub use graph::{AnnotationGraph, Function, Node};
pub use query::{EnrichmentEngine, EnrichmentRecord};

/// Result type alias for gmtdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gmtdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed GMT line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error(
        "Source not found: {location}. The data source may have moved; check \
         http://data.wikipathways.org/current/gmt/ and update the configured location"
    )]
    NotFound { location: String },

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Release mismatch in {source_location}: expected {expected}, found {found}")]
    VersionMismatch {
        expected: String,
        found: String,
        source_location: String,
    },

    #[error("Resolver error: {0}")]
    Resolver(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
