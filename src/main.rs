//! gmtdb CLI - load WikiPathways gene sets and query pathway membership

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gmtdb")]
#[command(version)]
#[command(about = "Pathway gene-set store built from WikiPathways GMT files")]
#[command(long_about = r#"
gmtdb loads WikiPathways GMT gene-set files into a SQLite store, reconciling
Entrez gene ids to HGNC symbols, and answers membership queries:
  • Which pathways contain these genes?
  • What are the members of this pathway?
  • Export gene sets or per-pathway annotation graphs as JSON

Example usage:
  gmtdb init
  gmtdb populate --source wikipathways-20180510-gmt-Homo_sapiens.gmt --hgnc hgnc_complete_set.txt
  gmtdb query --symbols UGT2B7,UGT2B4,CDKN1A
  gmtdb graph --pathway WP3596
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./gmtdb.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load GMT sources into the database
    Populate {
        /// GMT file path or URL (repeatable; loaded as one batch)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Per-species source as TAXON=LOCATION (repeatable)
        #[arg(long = "species", value_name = "TAXON=LOCATION")]
        species: Vec<String>,

        /// HGNC complete-set TSV path or URL
        #[arg(long)]
        hgnc: Option<String>,

        /// Load even if the database already holds pathways
        #[arg(short, long)]
        force: bool,
    },

    /// Drop all tables
    Drop {
        /// Confirm the drop
        #[arg(long)]
        yes: bool,
    },

    /// Export pathway gene sets as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find pathways containing any of the given gene symbols
    Query {
        /// Comma-separated HGNC symbols
        #[arg(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Export one pathway as an annotation graph (JSON)
    Graph {
        /// Pathway identifier, e.g. WP3596
        #[arg(short, long)]
        pathway: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show database statistics
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Search pathways by name fragment
    Search {
        /// Name fragment (case-insensitive)
        #[arg(short, long)]
        name: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Write a starter gmtdb.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        gmtdb::ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { force } = cli.command {
        let path = cli.config.unwrap_or_else(gmtdb::config::default_config_path);
        return commands::run_init(&path, force);
    }

    let config = gmtdb::config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let database = cli
        .database
        .or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| gmtdb::config::default_database_path_in(std::path::Path::new(".")));

    match cli.command {
        Commands::Populate { sources, species, hgnc, force } => {
            let request = commands::PopulateRequest::resolve(sources, species, hgnc, &config)?;
            commands::run_populate(&database, &request, force)
        }
        Commands::Drop { yes } => commands::run_drop(&database, yes),
        Commands::Export { output } => commands::run_export(&database, output.as_deref()),
        Commands::Query { symbols, format } => commands::run_query(&database, &symbols, format),
        Commands::Graph { pathway, output } => commands::run_graph(&database, &pathway, output.as_deref()),
        Commands::Stats { format } => commands::run_stats(&database, format),
        Commands::Search { name, limit } => commands::run_search(&database, &name, limit),
        Commands::Init { .. } => Ok(()),
    }
}
