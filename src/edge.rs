//! Edge types - annotated relationships between graph nodes
//!
//! Pathway membership exports only ever produce `PartOf` edges
//! (protein → pathway). The other relations exist so caller-supplied graphs
//! can be represented before they are enriched.

use crate::graph::Node;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// PubMed id cited on every membership edge (WikiPathways 2016 NAR update)
pub const MEMBERSHIP_CITATION: &str = "26481357";
/// Evidence text attached to every membership edge
pub const MEMBERSHIP_EVIDENCE: &str = "https://www.wikipathways.org/index.php/Download_Pathways";

/// Relationship kinds between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Member belongs to a pathway (protein → pathway)
    PartOf,
    /// Source increases target
    Increases,
    /// Source decreases target
    Decreases,
    /// Undirected association
    Association,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::PartOf => "partOf",
            Relation::Increases => "increases",
            Relation::Decreases => "decreases",
            Relation::Association => "association",
        }
    }

    pub fn all() -> &'static [Relation] {
        &[
            Relation::PartOf,
            Relation::Increases,
            Relation::Decreases,
            Relation::Association,
        ]
    }
}

impl FromStr for Relation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partof" | "part_of" | "part-of" => Ok(Relation::PartOf),
            "increases" | "increase" | "->" => Ok(Relation::Increases),
            "decreases" | "decrease" | "-|" => Ok(Relation::Decreases),
            "association" | "--" => Ok(Relation::Association),
            _ => Err(crate::Error::Resolver(format!("Unknown relation: {}", s))),
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed, annotated edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: Node,
    pub target: Node,
    pub relation: Relation,
    /// PubMed id backing the statement
    pub citation: String,
    /// Free-text evidence
    pub evidence: String,
}

impl Edge {
    pub fn new(
        source: Node,
        target: Node,
        relation: Relation,
        citation: impl Into<String>,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            relation,
            citation: citation.into(),
            evidence: evidence.into(),
        }
    }

    /// Membership edge `member → pathway` with the fixed citation/evidence pair
    pub fn part_of(member: Node, pathway: Node) -> Self {
        Self::new(member, pathway, Relation::PartOf, MEMBERSHIP_CITATION, MEMBERSHIP_EVIDENCE)
    }
}
