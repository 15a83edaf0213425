//! Population pipeline
//!
//! Orchestrates fetch → parse → resolve → load for one run:
//!
//! 1. Parse every source; all declared release tags must agree
//! 2. Pull the resolver's mapping tables once
//! 3. Load each pathway with its members inside its own transaction
//!
//! Unresolved Entrez ids are stored without a symbol and reported as a count
//! at the end of the run. Whether a store is already populated is the
//! caller's concern; re-running is safe but redoes the work.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use crate::fetch::Fetcher;
use crate::gmt::{self, GmtRecord};
use crate::model::{self, Pathway, Protein, Species};
use crate::resolver::{IdentifierResolver, MappingTables, Resolution};
use crate::storage::SqliteStore;
use crate::{Error, Result};

/// Where to load pathways from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    /// One GMT location
    Single(String),
    /// Several GMT locations loaded as one batch
    Many(Vec<String>),
    /// Taxonomy id → GMT location, one file per species
    BySpecies(BTreeMap<String, String>),
}

impl Sources {
    /// (taxonomy key, location) pairs in a stable order
    fn entries(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            Sources::Single(location) => vec![(None, location.as_str())],
            Sources::Many(locations) => locations.iter().map(|l| (None, l.as_str())).collect(),
            Sources::BySpecies(map) => map
                .iter()
                .map(|(taxonomy, location)| (Some(taxonomy.as_str()), location.as_str()))
                .collect(),
        }
    }
}

/// Run state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationState {
    Empty,
    Resolving,
    Loading,
    Committed,
}

/// Parsed records of one source
#[derive(Debug)]
struct ParsedSource {
    location: String,
    taxonomy: Option<String>,
    records: Vec<GmtRecord>,
}

/// Summary of a population run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PopulateStats {
    pub sources: usize,
    pub records: usize,
    pub pathways_created: usize,
    pub proteins_created: usize,
    pub memberships_added: usize,
    /// Release tag shared by the sources, if any declared one
    pub release: Option<String>,
    /// Entrez ids without an HGNC mapping, sorted
    pub missing_identifiers: BTreeSet<String>,
}

impl std::fmt::Display for PopulateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Population Statistics:")?;
        writeln!(f, "  Sources: {}", self.sources)?;
        writeln!(f, "  Release: {}", self.release.as_deref().unwrap_or("-"))?;
        writeln!(f, "  Pathway records: {}", self.records)?;
        writeln!(f, "  Pathways created: {}", self.pathways_created)?;
        writeln!(f, "  Proteins created: {}", self.proteins_created)?;
        writeln!(f, "  Memberships added: {}", self.memberships_added)?;
        writeln!(f, "  Unmapped identifiers: {}", self.missing_identifiers.len())
    }
}

/// Loads GMT sources into a store.
pub struct Populator<'a> {
    store: &'a mut SqliteStore,
    fetcher: &'a dyn Fetcher,
    resolver: &'a dyn IdentifierResolver,
    state: PopulationState,
}

impl<'a> Populator<'a> {
    pub fn new(
        store: &'a mut SqliteStore,
        fetcher: &'a dyn Fetcher,
        resolver: &'a dyn IdentifierResolver,
    ) -> Self {
        Self {
            store,
            fetcher,
            resolver,
            state: PopulationState::Empty,
        }
    }

    pub fn state(&self) -> PopulationState {
        self.state
    }

    fn transition(&mut self, next: PopulationState) {
        tracing::debug!("Population state {:?} → {:?}", self.state, next);
        self.state = next;
    }

    /// Run the whole pipeline.
    ///
    /// Malformed lines, missing sources and release mismatches abort before
    /// anything is written. A storage error mid-load, commit included, rolls
    /// back the current pathway only; earlier pathways stay committed.
    pub fn populate(&mut self, sources: &Sources) -> Result<PopulateStats> {
        let parsed = self.parse_sources(sources)?;
        let release = check_releases(&parsed)?;

        self.transition(PopulationState::Resolving);
        let tables = self.resolver.mapping_tables()?;
        tracing::info!("Resolver provided {} mappings", tables.len());

        self.transition(PopulationState::Loading);
        let mut stats = PopulateStats {
            sources: parsed.len(),
            release,
            ..PopulateStats::default()
        };
        let mut run = RunCache::default();

        for source in &parsed {
            for record in &source.records {
                self.store.begin_transaction()?;
                let loaded = self
                    .load_record(record, source.taxonomy.as_deref(), &tables, &mut run, &mut stats)
                    .and_then(|()| self.store.commit());
                if let Err(e) = loaded {
                    tracing::error!("Failed to load {}: {}", record.identifier, e);
                    // A failed COMMIT can leave the transaction open
                    if let Err(rollback_err) = self.store.rollback() {
                        tracing::debug!("Rollback after failed load: {}", rollback_err);
                    }
                    return Err(e);
                }
                stats.records += 1;
            }
        }

        self.transition(PopulationState::Committed);

        if !run.missing.is_empty() {
            tracing::warn!("Total of {} Entrez ids have no HGNC mapping", run.missing.len());
        }
        tracing::info!(
            "Loaded {} pathway records ({} new pathways, {} new proteins)",
            stats.records,
            stats.pathways_created,
            stats.proteins_created
        );

        stats.missing_identifiers = run.missing;
        Ok(stats)
    }

    fn parse_sources(&self, sources: &Sources) -> Result<Vec<ParsedSource>> {
        sources
            .entries()
            .into_iter()
            .map(|(taxonomy, location)| {
                Ok(ParsedSource {
                    location: location.to_string(),
                    taxonomy: taxonomy.map(str::to_string),
                    records: gmt::parse_gmt_source(self.fetcher, location)?,
                })
            })
            .collect()
    }

    /// Species, pathway, members and links of one record. Runs inside the
    /// caller's transaction.
    fn load_record(
        &mut self,
        record: &GmtRecord,
        taxonomy: Option<&str>,
        tables: &MappingTables,
        run: &mut RunCache,
        stats: &mut PopulateStats,
    ) -> Result<()> {
        let species = match &record.species {
            Some(name) => Some(self.species(name, taxonomy, run)?),
            None => None,
        };

        let pathway = self.pathway(record, species.as_ref(), stats)?;

        for entrez_id in &record.genes {
            let protein = self.protein(entrez_id, tables, run, stats)?;
            if self.store.add_membership(&pathway, &protein)? {
                stats.memberships_added += 1;
            }
        }

        tracing::debug!("Loaded {} with {} genes", pathway.identifier, record.genes.len());
        Ok(())
    }

    fn species(&mut self, name: &str, taxonomy: Option<&str>, run: &mut RunCache) -> Result<Species> {
        if let Some(species) = run.species.get(name) {
            return Ok(species.clone());
        }

        let taxonomy = taxonomy.or_else(|| model::taxonomy_for(name));
        let species = self.store.get_or_create_species(name, taxonomy)?;
        run.species.insert(name.to_string(), species.clone());
        Ok(species)
    }

    fn pathway(
        &mut self,
        record: &GmtRecord,
        species: Option<&Species>,
        stats: &mut PopulateStats,
    ) -> Result<Pathway> {
        use crate::storage::MembershipQuery;

        if let Some(pathway) = self.store.get_pathway_by_identifier(&record.identifier)? {
            return Ok(pathway);
        }

        stats.pathways_created += 1;
        self.store.get_or_create_pathway(
            &record.identifier,
            &record.name,
            species,
            record.revision.as_deref(),
        )
    }

    fn protein(
        &mut self,
        entrez_id: &str,
        tables: &MappingTables,
        run: &mut RunCache,
        stats: &mut PopulateStats,
    ) -> Result<Protein> {
        use crate::storage::MembershipQuery;

        if let Some(protein) = run.proteins.get(entrez_id) {
            return Ok(protein.clone());
        }

        let (symbol, hgnc_id) = match tables.resolve(entrez_id) {
            Resolution::Resolved { symbol, secondary_id } => (Some(symbol), secondary_id),
            Resolution::Unresolved => {
                tracing::debug!("Entrez id {} has no HGNC symbol", entrez_id);
                run.missing.insert(entrez_id.to_string());
                (None, None)
            }
        };

        let protein = match self.store.get_protein_by_entrez_id(entrez_id)? {
            Some(existing) => existing,
            None => {
                stats.proteins_created += 1;
                self.store.get_or_create_protein(entrez_id, symbol.as_deref(), hgnc_id.as_deref())?
            }
        };

        run.proteins.insert(entrez_id.to_string(), protein.clone());
        Ok(protein)
    }
}

/// Per-run lookaside caches. Never outlives one `populate` call.
#[derive(Debug, Default)]
struct RunCache {
    proteins: HashMap<String, Protein>,
    species: HashMap<String, Species>,
    missing: BTreeSet<String>,
}

/// All declared release tags must be identical; returns the shared tag.
fn check_releases(parsed: &[ParsedSource]) -> Result<Option<String>> {
    let mut expected: Option<&str> = None;

    for source in parsed {
        for release in source.records.iter().filter_map(|r| r.release.as_deref()) {
            match expected {
                None => expected = Some(release),
                Some(tag) if tag == release => {}
                Some(tag) => {
                    return Err(Error::VersionMismatch {
                        expected: tag.to_string(),
                        found: release.to_string(),
                        source_location: source.location.clone(),
                    });
                }
            }
        }
    }

    Ok(expected.map(str::to_string))
}
