//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - species(name, taxonomy_id)
//! - pathway(identifier, name, species_id, revision)
//! - protein(entrez_id, hgnc_symbol, hgnc_id)
//! - protein_pathway(protein_id, pathway_id)
//!
//! The store's capabilities are split into small traits so consumers can
//! depend on only what they use.

pub mod schema;
pub mod sqlite;

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use crate::Result;
use crate::model::{Pathway, Protein};

pub use sqlite::{SqliteStore, DbStats};

/// Create, drop and inspect the schema.
pub trait SchemaLifecycle {
    /// Create all tables and indexes (no-op for existing ones)
    fn create_all(&self) -> Result<()>;

    /// Drop all tables
    fn drop_all(&self) -> Result<()>;

    /// Delete every row, keeping the schema
    fn clear_all(&self) -> Result<()>;

    /// Whether any pathway has been loaded
    fn is_populated(&self) -> Result<bool>;
}

/// Gene set of one pathway as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneSet {
    pub name: String,
    pub symbols: BTreeSet<String>,
}

/// Export pathway membership as plain gene sets.
pub trait GeneSetExport {
    /// Pathway identifier → gene set (resolved symbols only)
    fn export_gene_sets(&self) -> Result<BTreeMap<String, GeneSet>>;

    /// Pathway name → identifiers carrying that name
    fn pathway_names_to_ids(&self) -> Result<BTreeMap<String, Vec<String>>>;
}

/// Read-side membership lookups used by the enrichment engine.
///
/// Misses are `None` or empty collections, never errors.
pub trait MembershipQuery {
    fn get_pathway_by_identifier(&self, identifier: &str) -> Result<Option<Pathway>>;

    /// All pathways with exactly this display name, ordered by identifier
    fn find_pathways_by_name(&self, name: &str) -> Result<Vec<Pathway>>;

    fn get_protein_by_entrez_id(&self, entrez_id: &str) -> Result<Option<Protein>>;

    fn get_protein_by_symbol(&self, symbol: &str) -> Result<Option<Protein>>;

    fn get_protein_by_hgnc_id(&self, hgnc_id: &str) -> Result<Option<Protein>>;

    /// Distinct proteins whose symbol is in the set, ordered by entrez id
    fn get_proteins_by_symbols(&self, symbols: &BTreeSet<String>) -> Result<Vec<Protein>>;

    /// Members of a pathway, ordered by entrez id
    fn proteins_of_pathway(&self, pathway: &Pathway) -> Result<Vec<Protein>>;

    /// Pathways a protein belongs to, ordered by identifier
    fn pathways_of_protein(&self, protein: &Protein) -> Result<Vec<Pathway>>;
}
