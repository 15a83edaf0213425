//! Annotation graph - in-memory directed graph of pathways and members
//!
//! Built by the enrichment engine for export, or supplied by a caller and
//! extended in place. Nodes are identified by value; adding the same node or
//! the same edge twice is a no-op.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use crate::edge::{Edge, Relation};

/// Biological function of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Function {
    Protein,
    Gene,
    Rna,
    BiologicalProcess,
}

impl Function {
    pub fn as_str(&self) -> &'static str {
        match self {
            Function::Protein => "p",
            Function::Gene => "g",
            Function::Rna => "r",
            Function::BiologicalProcess => "bp",
        }
    }
}

/// A graph node: namespace-qualified entity with an optional identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    pub function: Function,
    pub namespace: String,
    pub identifier: Option<String>,
    pub name: String,
}

impl Node {
    pub fn new(
        function: Function,
        namespace: impl Into<String>,
        identifier: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            function,
            namespace: namespace.into(),
            identifier,
            name: name.into(),
        }
    }

    /// Case-insensitive namespace test
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.eq_ignore_ascii_case(namespace)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}:{})", self.function.as_str(), self.namespace, self.name)
    }
}

/// Directed multigraph keyed by node value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "GraphData")]
pub struct AnnotationGraph {
    /// Graph label
    pub name: String,
    nodes: BTreeSet<Node>,
    edges: Vec<Edge>,
    /// Outgoing edge positions per node
    #[serde(skip)]
    edges_from: BTreeMap<Node, Vec<usize>>,
    /// Incoming edge positions per node
    #[serde(skip)]
    edges_to: BTreeMap<Node, Vec<usize>>,
}

/// Serialized shape of a graph; indices are rebuilt on load.
#[derive(Deserialize)]
struct GraphData {
    name: String,
    #[serde(default)]
    nodes: BTreeSet<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<GraphData> for AnnotationGraph {
    fn from(data: GraphData) -> Self {
        let mut graph = AnnotationGraph::new(data.name);
        graph.nodes = data.nodes;
        for edge in data.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

impl AnnotationGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a node; returns `false` if it was already present
    pub fn add_node(&mut self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    /// Add an edge (and its endpoints). Returns `false` when an identical
    /// edge already exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.contains_edge(&edge) {
            return false;
        }

        self.nodes.insert(edge.source.clone());
        self.nodes.insert(edge.target.clone());

        let position = self.edges.len();
        self.edges_from.entry(edge.source.clone()).or_default().push(position);
        self.edges_to.entry(edge.target.clone()).or_default().push(position);
        self.edges.push(edge);
        true
    }

    pub fn contains_node(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges_from
            .get(&edge.source)
            .map(|positions| positions.iter().any(|&i| self.edges[i] == *edge))
            .unwrap_or(false)
    }

    /// Outgoing edges of a node
    pub fn edges_from(&self, node: &Node) -> Vec<&Edge> {
        self.edges_from
            .get(node)
            .map(|positions| positions.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Incoming edges of a node
    pub fn edges_to(&self, node: &Node) -> Vec<&Edge> {
        self.edges_to
            .get(node)
            .map(|positions| positions.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Sources of incoming edges of a given relation
    pub fn predecessors(&self, node: &Node, relation: Relation) -> Vec<&Node> {
        self.edges_to(node)
            .into_iter()
            .filter(|e| e.relation == relation)
            .map(|e| &e.source)
            .collect()
    }

    /// Targets of outgoing edges of a given relation
    pub fn successors(&self, node: &Node, relation: Relation) -> Vec<&Node> {
        self.edges_from(node)
            .into_iter()
            .filter(|e| e.relation == relation)
            .map(|e| &e.target)
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }
}
