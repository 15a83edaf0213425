//! Domain types - pathways, proteins and species
//!
//! Rows are identified in the store by an integer `id`; the stable external
//! keys are `Pathway::identifier` (e.g. `WP1604`) and `Protein::entrez_id`.

use serde::{Deserialize, Serialize};
use crate::graph::{Function, Node};

/// Namespace of pathway nodes
pub const WIKIPATHWAYS: &str = "wikipathways";
/// Namespace of resolved protein nodes
pub const HGNC: &str = "hgnc";
/// Namespace of protein nodes that have no HGNC mapping
pub const NCBIGENE: &str = "ncbigene";

/// NCBI taxonomy ids for the species WikiPathways publishes GMT files for.
const KNOWN_TAXONOMIES: &[(&str, &str)] = &[
    ("Homo sapiens", "9606"),
    ("Mus musculus", "10090"),
    ("Rattus norvegicus", "10116"),
    ("Bos taurus", "9913"),
    ("Canis familiaris", "9615"),
    ("Danio rerio", "7955"),
    ("Drosophila melanogaster", "7227"),
    ("Caenorhabditis elegans", "6239"),
    ("Saccharomyces cerevisiae", "4932"),
    ("Arabidopsis thaliana", "3702"),
    ("Gallus gallus", "9031"),
    ("Sus scrofa", "9823"),
];

/// Look up the NCBI taxonomy id of a species display name.
pub fn taxonomy_for(species_name: &str) -> Option<&'static str> {
    KNOWN_TAXONOMIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(species_name))
        .map(|(_, taxonomy)| *taxonomy)
}

/// A host species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    /// Display name, e.g. `Homo sapiens`
    pub name: String,
    /// NCBI taxonomy id, e.g. `9606`
    pub taxonomy_id: Option<String>,
}

/// A pathway and its external identity. Members live in the join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pathway {
    pub id: i64,
    /// WikiPathways identifier, unique in the store
    pub identifier: String,
    /// Display name. Not unique: WikiPathways reuses names.
    pub name: String,
    pub species_id: Option<i64>,
    pub revision: Option<String>,
}

impl Pathway {
    /// Serialize to a graph node in the pathway namespace
    pub fn to_node(&self) -> Node {
        Node::new(
            Function::BiologicalProcess,
            WIKIPATHWAYS,
            Some(self.identifier.clone()),
            self.name.clone(),
        )
    }
}

/// A gene product keyed by its Entrez id.
///
/// `hgnc_symbol` and `hgnc_id` are `None` when the resolver had no mapping
/// at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protein {
    pub id: i64,
    pub entrez_id: String,
    pub hgnc_symbol: Option<String>,
    pub hgnc_id: Option<String>,
}

impl Protein {
    pub fn is_resolved(&self) -> bool {
        self.hgnc_symbol.is_some()
    }

    /// Serialize to a graph node. Resolved proteins land in the HGNC
    /// namespace; unresolved ones keep their Entrez identity.
    pub fn to_node(&self) -> Node {
        match &self.hgnc_symbol {
            Some(symbol) => Node::new(Function::Protein, HGNC, self.hgnc_id.clone(), symbol.clone()),
            None => Node::new(
                Function::Protein,
                NCBIGENE,
                Some(self.entrez_id.clone()),
                self.entrez_id.clone(),
            ),
        }
    }
}
