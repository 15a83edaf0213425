//! Database schema definitions

/// SQL to create the species table
pub const CREATE_SPECIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS species (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    taxonomy_id TEXT
)
"#;

/// SQL to create the pathway table
pub const CREATE_PATHWAY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pathway (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    species_id INTEGER REFERENCES species(id),
    revision TEXT
)
"#;

/// SQL to create the protein table
pub const CREATE_PROTEIN_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS protein (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entrez_id TEXT NOT NULL UNIQUE,
    hgnc_symbol TEXT,
    hgnc_id TEXT
)
"#;

/// SQL to create the membership join table.
/// The composite key is the only owner of a pathway/protein link.
pub const CREATE_PROTEIN_PATHWAY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS protein_pathway (
    protein_id INTEGER NOT NULL REFERENCES protein(id),
    pathway_id INTEGER NOT NULL REFERENCES pathway(id),
    PRIMARY KEY (protein_id, pathway_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_pathway_name ON pathway(name)",
    "CREATE INDEX IF NOT EXISTS idx_protein_symbol ON protein(hgnc_symbol)",
    "CREATE INDEX IF NOT EXISTS idx_protein_hgnc_id ON protein(hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_membership_pathway ON protein_pathway(pathway_id)",
];

/// Tables in drop order (join table first)
pub const TABLES: &[&str] = &["protein_pathway", "protein", "pathway", "species"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_SPECIES_TABLE,
        CREATE_PATHWAY_TABLE,
        CREATE_PROTEIN_TABLE,
        CREATE_PROTEIN_PATHWAY_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
