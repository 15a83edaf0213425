//! Enrichment engine implementation
//!
//! Provides read-side operations over a populated store:
//! - Symbol-set enrichment (which pathways contain the query genes)
//! - Pathway → annotation graph export
//! - In-place enrichment of caller-supplied graphs

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use crate::Result;
use crate::edge::Edge;
use crate::graph::{AnnotationGraph, Function, Node};
use crate::model::{HGNC, NCBIGENE, Pathway, Protein, WIKIPATHWAYS};
use crate::storage::MembershipQuery;

/// One pathway hit of an enrichment query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub pathway_id: String,
    pub pathway_name: String,
    /// Distinct query proteins that are members of the pathway
    pub mapped_proteins: usize,
    /// Full membership, unresolved members included
    pub pathway_size: usize,
    /// Symbols of all resolved members
    pub pathway_gene_set: BTreeSet<String>,
}

/// Query engine over any store that answers membership lookups
pub struct EnrichmentEngine<'a, S: MembershipQuery> {
    store: &'a S,
}

impl<'a, S: MembershipQuery> EnrichmentEngine<'a, S> {
    /// Create a new enrichment engine
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Pathways containing any of the query symbols, keyed by pathway
    /// identifier.
    ///
    /// Symbols unknown to the store are ignored; a query with no known
    /// symbol yields an empty map.
    pub fn query_by_symbols(&self, symbols: &BTreeSet<String>) -> Result<BTreeMap<String, EnrichmentRecord>> {
        let proteins = self.store.get_proteins_by_symbols(symbols)?;
        tracing::debug!("{} of {} query symbols matched a protein", proteins.len(), symbols.len());

        // pathway identifier → (pathway, matched protein count)
        let mut counts: BTreeMap<String, (Pathway, usize)> = BTreeMap::new();
        for protein in &proteins {
            for pathway in self.store.pathways_of_protein(protein)? {
                counts
                    .entry(pathway.identifier.clone())
                    .or_insert_with(|| (pathway, 0))
                    .1 += 1;
            }
        }

        let mut results = BTreeMap::new();
        for (identifier, (pathway, mapped_proteins)) in counts {
            let members = self.store.proteins_of_pathway(&pathway)?;
            let pathway_gene_set = members
                .iter()
                .filter_map(|p| p.hgnc_symbol.clone())
                .collect();

            results.insert(
                identifier,
                EnrichmentRecord {
                    pathway_id: pathway.identifier,
                    pathway_name: pathway.name,
                    mapped_proteins,
                    pathway_size: members.len(),
                    pathway_gene_set,
                },
            );
        }

        Ok(results)
    }

    /// Graph of one pathway: a node per member, a `PartOf` edge from each
    /// member to the pathway node. `None` if the identifier is unknown.
    pub fn pathway_to_annotation_graph(&self, identifier: &str) -> Result<Option<AnnotationGraph>> {
        let Some(pathway) = self.store.get_pathway_by_identifier(identifier)? else {
            return Ok(None);
        };

        let mut graph = AnnotationGraph::new(format!("{} graph", pathway.name));
        let pathway_node = pathway.to_node();
        graph.add_node(pathway_node.clone());

        for protein in self.store.proteins_of_pathway(&pathway)? {
            graph.add_edge(Edge::part_of(protein.to_node(), pathway_node.clone()));
        }

        Ok(Some(graph))
    }

    /// For every pathway node in the graph, add `PartOf` edges from each of
    /// its members. Returns the number of edges added.
    ///
    /// A node is looked up by identifier; when that is absent or unknown,
    /// every pathway sharing the node's name contributes its members.
    /// Unknown pathways are skipped.
    pub fn enrich_pathway_node_in_graph(&self, graph: &mut AnnotationGraph) -> Result<usize> {
        let targets: Vec<Node> = graph
            .nodes()
            .filter(|n| n.function == Function::BiologicalProcess && n.in_namespace(WIKIPATHWAYS))
            .cloned()
            .collect();

        let mut added = 0;
        for node in targets {
            let pathways = self.pathways_for_node(&node)?;
            if pathways.is_empty() {
                tracing::debug!("No pathway matches {}", node);
            }
            for pathway in pathways {
                for protein in self.store.proteins_of_pathway(&pathway)? {
                    if graph.add_edge(Edge::part_of(protein.to_node(), node.clone())) {
                        added += 1;
                    }
                }
            }
        }

        Ok(added)
    }

    /// For every protein node in the graph, add `PartOf` edges to each
    /// pathway it belongs to. Returns the number of edges added.
    ///
    /// HGNC nodes match by identifier, falling back to the symbol; NCBI gene
    /// nodes match by Entrez id. Unknown proteins are skipped.
    pub fn enrich_protein_node_in_graph(&self, graph: &mut AnnotationGraph) -> Result<usize> {
        let targets: Vec<Node> = graph
            .nodes()
            .filter(|n| n.function == Function::Protein)
            .cloned()
            .collect();

        let mut added = 0;
        for node in targets {
            let Some(protein) = self.protein_for_node(&node)? else {
                continue;
            };
            for pathway in self.store.pathways_of_protein(&protein)? {
                if graph.add_edge(Edge::part_of(node.clone(), pathway.to_node())) {
                    added += 1;
                }
            }
        }

        Ok(added)
    }

    /// Identifier first; a missing or unknown identifier falls back to the name
    fn pathways_for_node(&self, node: &Node) -> Result<Vec<Pathway>> {
        if let Some(identifier) = &node.identifier {
            if let Some(pathway) = self.store.get_pathway_by_identifier(identifier)? {
                return Ok(vec![pathway]);
            }
        }
        self.store.find_pathways_by_name(&node.name)
    }

    fn protein_for_node(&self, node: &Node) -> Result<Option<Protein>> {
        if node.in_namespace(HGNC) {
            if let Some(hgnc_id) = &node.identifier {
                if let Some(protein) = self.store.get_protein_by_hgnc_id(hgnc_id)? {
                    return Ok(Some(protein));
                }
            }
            self.store.get_protein_by_symbol(&node.name)
        } else if node.in_namespace(NCBIGENE) {
            let entrez_id = node.identifier.as_deref().unwrap_or(&node.name);
            self.store.get_protein_by_entrez_id(entrez_id)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Relation;
    use crate::fetch::Fetcher;
    use crate::pipeline::{Populator, Sources};
    use crate::resolver::HgncTable;
    use crate::storage::SqliteStore;

    const GMT: &str = include_str!("../../tests/fixtures/wikipathways-20180510-gmt-Homo_sapiens.gmt");
    const HGNC_TSV: &str = include_str!("../../tests/fixtures/hgnc_complete_set_subset.tsv");

    struct FixtureFetcher;

    impl Fetcher for FixtureFetcher {
        fn fetch(&self, _location: &str) -> Result<String> {
            Ok(GMT.to_string())
        }
    }

    fn populated_store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let resolver = HgncTable::from_tsv(HGNC_TSV).unwrap();
        Populator::new(&mut store, &FixtureFetcher, &resolver)
            .populate(&Sources::Single("fixture".into()))
            .unwrap();
        store
    }

    fn symbols(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn hgnc_protein(symbol: &str, hgnc_id: Option<&str>) -> Node {
        Node::new(Function::Protein, "hgnc", hgnc_id.map(str::to_string), symbol)
    }

    #[test]
    fn test_query_counts_and_sizes() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let results = engine.query_by_symbols(&symbols(&["UGT2B7", "UGT2B4", "CDKN1A"])).unwrap();

        assert_eq!(
            results["WP1604"],
            EnrichmentRecord {
                pathway_id: "WP1604".to_string(),
                pathway_name: "Codeine and Morphine Metabolism".to_string(),
                mapped_proteins: 2,
                pathway_size: 2,
                pathway_gene_set: symbols(&["UGT2B7", "UGT2B4"]),
            }
        );
        assert_eq!(
            results["WP536"],
            EnrichmentRecord {
                pathway_id: "WP536".to_string(),
                pathway_name: "Calcium Regulation in the Cardiac Cell".to_string(),
                mapped_proteins: 1,
                pathway_size: 6,
                pathway_gene_set: symbols(&["MIR6869", "RGS5", "UGT2B4", "GNGT1", "GNG11", "KCNJ3"]),
            }
        );
        assert_eq!(results["WP3596"].mapped_proteins, 1);
        assert_eq!(results["WP3596"].pathway_size, 5);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_single_symbol_query() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let results = engine.query_by_symbols(&symbols(&["MAT2B"])).unwrap();
        assert_eq!(results.len(), 1);
        let record = &results["WP2333"];
        assert_eq!(record.pathway_name, "Trans-sulfuration pathway");
        assert_eq!(record.mapped_proteins, 1);
        assert_eq!(record.pathway_size, 3);
        assert_eq!(record.pathway_gene_set, symbols(&["DNMT1", "MAT2B", "GCLM"]));
    }

    #[test]
    fn test_unresolved_members_count_toward_size_only() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let results = engine.query_by_symbols(&symbols(&["POLA1"])).unwrap();
        let record = &results["WP4022"];
        assert_eq!(record.pathway_size, 3);
        assert_eq!(record.pathway_gene_set, symbols(&["POLA1", "PGLS"]));
    }

    #[test]
    fn test_unknown_symbols_give_empty_result() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        assert!(engine.query_by_symbols(&symbols(&["NOPE", "TP53"])).unwrap().is_empty());
        assert!(engine.query_by_symbols(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_pathway_graph() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let graph = engine.pathway_to_annotation_graph("WP3596").unwrap().unwrap();
        assert_eq!(graph.number_of_nodes(), 6); // 5 proteins + pathway node
        assert_eq!(graph.number_of_edges(), 5); // one member → pathway edge each

        let pathway_node = graph
            .nodes()
            .find(|n| n.function == Function::BiologicalProcess)
            .unwrap()
            .clone();
        assert_eq!(graph.predecessors(&pathway_node, Relation::PartOf).len(), 5);
        assert!(graph.edges().all(|e| e.target == pathway_node));
    }

    #[test]
    fn test_unknown_pathway_graph_is_none() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);
        assert!(engine.pathway_to_annotation_graph("WP0").unwrap().is_none());
    }

    #[test]
    fn test_enrich_pathway_nodes() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let dnmt1 = hgnc_protein("DNMT1", Some("HGNC:2976"));
        let pola1 = hgnc_protein("POLA1", Some("HGNC:9173"));
        let pgls = Node::new(Function::Gene, "hgnc", Some("HGNC:8903".to_string()), "PGLS");
        let codeine = Node::new(
            Function::BiologicalProcess,
            "WIKIPATHWAYS",
            Some("WP1604".to_string()),
            "Codeine and Morphine Metabolism",
        );

        let mut graph = AnnotationGraph::new("enrichment test");
        graph.add_edge(Edge::new(dnmt1, pola1.clone(), Relation::Increases, "1234", ""));
        graph.add_edge(Edge::new(pola1, pgls.clone(), Relation::Decreases, "1234", ""));
        graph.add_edge(Edge::new(pgls, codeine, Relation::PartOf, "1234", ""));
        assert_eq!(graph.number_of_nodes(), 4);

        let added = engine.enrich_pathway_node_in_graph(&mut graph).unwrap();

        assert_eq!(added, 2);
        assert_eq!(graph.number_of_nodes(), 6); // 4 nodes + UGT2B7, UGT2B4
        assert_eq!(graph.number_of_edges(), 5); // 3 + 2 new
    }

    #[test]
    fn test_enrich_pathway_node_by_shared_name() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let mut graph = AnnotationGraph::new("by name");
        graph.add_node(Node::new(Function::BiologicalProcess, "wikipathways", None, "Trans-sulfuration pathway"));
        graph.add_node(Node::new(Function::BiologicalProcess, "wikipathways", None, "Not a pathway"));

        assert_eq!(engine.enrich_pathway_node_in_graph(&mut graph).unwrap(), 3);
    }

    #[test]
    fn test_enrich_protein_nodes() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let mut graph = AnnotationGraph::new("protein test");
        graph.add_node(hgnc_protein("UGT2B4", Some("HGNC:12553")));
        graph.add_node(hgnc_protein("UGT2B7", None));
        graph.add_node(hgnc_protein("UNKNOWN", None));

        let added = engine.enrich_protein_node_in_graph(&mut graph).unwrap();

        // UGT2B4 → WP1604, WP536; UGT2B7 → WP1604
        assert_eq!(added, 3);
        assert_eq!(graph.number_of_nodes(), 5);
        assert_eq!(graph.number_of_edges(), 3);

        // Enriching again adds nothing
        assert_eq!(engine.enrich_protein_node_in_graph(&mut graph).unwrap(), 0);
    }

    #[test]
    fn test_enrich_protein_node_with_foreign_hgnc_id() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        // Bare numeric id does not match the stored "HGNC:12553"; the symbol does
        let mut graph = AnnotationGraph::new("bare id");
        graph.add_node(Node::new(Function::Protein, "HGNC", Some("12553".to_string()), "UGT2B4"));

        assert_eq!(engine.enrich_protein_node_in_graph(&mut graph).unwrap(), 2);
        assert_eq!(graph.number_of_nodes(), 3);
    }

    #[test]
    fn test_enrich_pathway_node_with_unknown_identifier_uses_name() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let mut graph = AnnotationGraph::new("stale id");
        graph.add_node(Node::new(
            Function::BiologicalProcess,
            "wikipathways",
            Some("WP99999".to_string()),
            "Codeine and Morphine Metabolism",
        ));

        assert_eq!(engine.enrich_pathway_node_in_graph(&mut graph).unwrap(), 2);
    }

    #[test]
    fn test_enrich_loaded_graph_adds_no_duplicates() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let exported = engine.pathway_to_annotation_graph("WP3596").unwrap().unwrap();
        let json = serde_json::to_string(&exported).unwrap();
        let mut graph: AnnotationGraph = serde_json::from_str(&json).unwrap();

        assert_eq!(engine.enrich_pathway_node_in_graph(&mut graph).unwrap(), 0);
        assert_eq!(engine.enrich_protein_node_in_graph(&mut graph).unwrap(), 0);
        assert_eq!(graph.number_of_edges(), 5);
    }

    #[test]
    fn test_enrich_ncbigene_protein_node() {
        let store = populated_store();
        let engine = EnrichmentEngine::new(&store);

        let mut graph = AnnotationGraph::new("entrez");
        graph.add_node(Node::new(Function::Protein, "ncbigene", Some("999999999".to_string()), "999999999"));

        assert_eq!(engine.enrich_protein_node_in_graph(&mut graph).unwrap(), 1);
    }
}
