use crate::Format;
use gmtdb::config::{self, GmtdbConfig};
use gmtdb::storage::{GeneSetExport, SchemaLifecycle};
use gmtdb::ui::{self, Icons};
use gmtdb::{EnrichmentEngine, HgncTable, Populator, SourceFetcher, Sources, SqliteStore};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tabled::Tabled;

/// Sources and resolver location for one `populate` run, after merging
/// command-line flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateRequest {
    pub sources: Sources,
    pub hgnc: String,
}

impl PopulateRequest {
    pub fn resolve(
        sources: Vec<String>,
        species: Vec<String>,
        hgnc: Option<String>,
        config: &GmtdbConfig,
    ) -> anyhow::Result<Self> {
        let hgnc = hgnc
            .or_else(|| config.hgnc.clone())
            .ok_or_else(|| anyhow::anyhow!("no HGNC source given (use --hgnc or set `hgnc` in the config)"))?;

        let mut by_species = BTreeMap::new();
        for entry in &species {
            let (taxon, location) = entry
                .split_once('=')
                .filter(|(t, l)| !t.is_empty() && !l.is_empty())
                .ok_or_else(|| anyhow::anyhow!("invalid --species '{}', expected TAXON=LOCATION", entry))?;
            by_species.insert(taxon.to_string(), location.to_string());
        }

        // Flags win over the config; species tables win over plain sources
        let sources = if !by_species.is_empty() {
            Sources::BySpecies(by_species)
        } else if !sources.is_empty() {
            into_sources(sources)
        } else if !config.species.is_empty() {
            Sources::BySpecies(config.species.clone())
        } else if !config.sources.is_empty() {
            into_sources(config.sources.clone())
        } else {
            anyhow::bail!("no GMT source given (use --source/--species or set them in the config)");
        };

        Ok(Self { sources, hgnc })
    }
}

fn into_sources(mut locations: Vec<String>) -> Sources {
    if locations.len() == 1 {
        Sources::Single(locations.remove(0))
    } else {
        Sources::Many(locations)
    }
}

fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(database)?;
    Ok(SqliteStore::open(database)?)
}

fn write_output(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
        None => println!("{}", contents),
    }
    Ok(())
}

pub fn run_init(path: &Path, force: bool) -> anyhow::Result<()> {
    config::write_config(path, &GmtdbConfig::starter(), force)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

pub fn run_populate(database: &Path, request: &PopulateRequest, force: bool) -> anyhow::Result<()> {
    let mut store = open_store(database)?;

    if store.is_populated()? && !force {
        ui::warn("Database already populated; use --force to load again");
        return Ok(());
    }

    ui::header("Populating gene-set database");
    ui::status(Icons::DATABASE, "Database", &database.display().to_string());
    ui::status(Icons::DNA, "HGNC", &request.hgnc);

    let fetcher = SourceFetcher::new();
    let spinner = ui::Spinner::new("Loading HGNC mappings");
    let resolver = HgncTable::load(&fetcher, &request.hgnc)?;

    spinner.set_message("Loading pathways");
    let stats = Populator::new(&mut store, &fetcher, &resolver).populate(&request.sources);
    spinner.finish_and_clear();
    let stats = stats?;

    if !stats.missing_identifiers.is_empty() {
        ui::warn(&format!(
            "{} Entrez ids have no HGNC mapping",
            stats.missing_identifiers.len()
        ));
    }

    ui::section("Population");
    println!(
        "{}",
        ui::stats_table(&[
            ("Sources", stats.sources.to_string()),
            ("Release", stats.release.clone().unwrap_or_else(|| "-".to_string())),
            ("Pathway records", stats.records.to_string()),
            ("Pathways created", stats.pathways_created.to_string()),
            ("Proteins created", stats.proteins_created.to_string()),
            ("Memberships added", stats.memberships_added.to_string()),
            ("Unmapped ids", stats.missing_identifiers.len().to_string()),
        ])
    );
    ui::success("Population complete");
    Ok(())
}

pub fn run_drop(database: &Path, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("refusing to drop {} without --yes", database.display());
    }
    if !database.exists() {
        ui::warn(&format!("No database at {}", database.display()));
        return Ok(());
    }

    let store = SqliteStore::open(database)?;
    store.drop_all()?;
    ui::status(Icons::DEL, "Dropped", &database.display().to_string());
    Ok(())
}

pub fn run_export(database: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let gene_sets = store.export_gene_sets()?;
    tracing::info!("Exporting {} gene sets", gene_sets.len());
    write_output(output, &serde_json::to_string_pretty(&gene_sets)?)
}

#[derive(Tabled)]
struct EnrichmentRow {
    #[tabled(rename = "Pathway")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mapped")]
    mapped: usize,
    #[tabled(rename = "Size")]
    size: usize,
}

pub fn run_query(database: &Path, symbols: &[String], format: Format) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let engine = EnrichmentEngine::new(&store);

    let query: BTreeSet<String> = symbols
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let results = engine.query_by_symbols(&query)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        Format::Text => {
            ui::status(Icons::SEARCH, "Query", &query.iter().cloned().collect::<Vec<_>>().join(", "));
            if results.is_empty() {
                ui::warn("No pathway contains the given symbols");
                return Ok(());
            }
            let rows: Vec<EnrichmentRow> = results
                .values()
                .map(|r| EnrichmentRow {
                    id: r.pathway_id.clone(),
                    name: r.pathway_name.clone(),
                    mapped: r.mapped_proteins,
                    size: r.pathway_size,
                })
                .collect();
            println!("{}", ui::rows_table(&rows));
        }
    }
    Ok(())
}

pub fn run_graph(database: &Path, pathway: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let engine = EnrichmentEngine::new(&store);

    let graph = engine
        .pathway_to_annotation_graph(pathway)?
        .ok_or_else(|| anyhow::anyhow!("pathway {} not found", pathway))?;
    tracing::info!(
        "{}: {} nodes, {} edges",
        graph.name,
        graph.number_of_nodes(),
        graph.number_of_edges()
    );
    write_output(output, &serde_json::to_string_pretty(&graph)?)
}

pub fn run_stats(database: &Path, format: Format) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let stats = store.stats()?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        Format::Text => {
            ui::status(Icons::STATS, "Database", &database.display().to_string());
            println!(
                "{}",
                ui::stats_table(&[
                    ("Species", stats.species.to_string()),
                    ("Pathways", stats.pathways.to_string()),
                    ("Proteins", stats.proteins.to_string()),
                    ("Without HGNC mapping", stats.unresolved_proteins.to_string()),
                    ("Memberships", stats.memberships.to_string()),
                ])
            );
        }
    }
    Ok(())
}

pub fn run_search(database: &Path, name: &str, limit: usize) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let pathways = store.search_pathways_by_name(name, Some(limit))?;

    if pathways.is_empty() {
        ui::warn(&format!("No pathway name contains '{}'", name));
        return Ok(());
    }

    ui::info("Matches", &pathways.len().to_string());
    for pathway in pathways {
        ui::summary_row(&pathway.identifier, &pathway.name);
    }
    Ok(())
}
