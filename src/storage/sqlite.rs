//! SQLite storage implementation

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use rusqlite::{Connection, params, params_from_iter, OptionalExtension};
use crate::Result;
use crate::model::{Pathway, Protein, Species};
use super::{schema, GeneSet, GeneSetExport, MembershipQuery, SchemaLifecycle};

const PATHWAY_COLUMNS: &str = "p.id, p.identifier, p.name, p.species_id, p.revision";
const PROTEIN_COLUMNS: &str = "pr.id, pr.entrez_id, pr.hgnc_symbol, pr.hgnc_id";

/// SQLite-backed Pathway ↔ Protein membership store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON")?;
        self.create_all()
    }

    // ========== Species Operations ==========

    /// Get a species by display name
    pub fn get_species_by_name(&self, name: &str) -> Result<Option<Species>> {
        self.conn
            .query_row(
                "SELECT id, name, taxonomy_id FROM species WHERE name = ?1",
                [name],
                |row| self.row_to_species(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a species by name or create it
    pub fn get_or_create_species(&self, name: &str, taxonomy_id: Option<&str>) -> Result<Species> {
        if let Some(species) = self.get_species_by_name(name)? {
            return Ok(species);
        }

        self.conn.execute(
            "INSERT INTO species (name, taxonomy_id) VALUES (?1, ?2)",
            params![name, taxonomy_id],
        )?;

        Ok(Species {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            taxonomy_id: taxonomy_id.map(str::to_string),
        })
    }

    fn row_to_species(&self, row: &rusqlite::Row) -> rusqlite::Result<Species> {
        Ok(Species {
            id: row.get(0)?,
            name: row.get(1)?,
            taxonomy_id: row.get(2)?,
        })
    }

    // ========== Pathway Operations ==========

    /// Get a pathway by identifier or create it.
    ///
    /// An existing row is returned untouched; name, species and revision
    /// only apply on creation.
    pub fn get_or_create_pathway(
        &self,
        identifier: &str,
        name: &str,
        species: Option<&Species>,
        revision: Option<&str>,
    ) -> Result<Pathway> {
        if let Some(pathway) = self.get_pathway_by_identifier(identifier)? {
            return Ok(pathway);
        }

        let species_id = species.map(|s| s.id);
        self.conn.execute(
            "INSERT INTO pathway (identifier, name, species_id, revision) VALUES (?1, ?2, ?3, ?4)",
            params![identifier, name, species_id, revision],
        )?;

        Ok(Pathway {
            id: self.conn.last_insert_rowid(),
            identifier: identifier.to_string(),
            name: name.to_string(),
            species_id,
            revision: revision.map(str::to_string),
        })
    }

    /// First pathway with this name in identifier order.
    ///
    /// Names are not unique; use [`MembershipQuery::find_pathways_by_name`]
    /// when every match matters.
    pub fn get_pathway_by_name(&self, name: &str) -> Result<Option<Pathway>> {
        Ok(self.find_pathways_by_name(name)?.into_iter().next())
    }

    /// Pathways whose name contains `fragment` (ASCII case-insensitive,
    /// taken literally), ordered by identifier
    pub fn search_pathways_by_name(&self, fragment: &str, limit: Option<usize>) -> Result<Vec<Pathway>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let sql = format!(
            "SELECT {} FROM pathway p WHERE instr(lower(p.name), lower(?1)) > 0 \
             ORDER BY p.identifier LIMIT ?2",
            PATHWAY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pathways = stmt
            .query_map(params![fragment, limit], |row| self.row_to_pathway(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pathways)
    }

    /// All pathways, ordered by identifier
    pub fn list_pathways(&self) -> Result<Vec<Pathway>> {
        let sql = format!("SELECT {} FROM pathway p ORDER BY p.identifier", PATHWAY_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let pathways = stmt
            .query_map([], |row| self.row_to_pathway(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pathways)
    }

    /// Pathways containing any protein with one of the given HGNC ids
    pub fn get_pathways_by_hgnc_ids(&self, hgnc_ids: &BTreeSet<String>) -> Result<Vec<Pathway>> {
        if hgnc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT DISTINCT {} FROM pathway p \
             JOIN protein_pathway pp ON pp.pathway_id = p.id \
             JOIN protein pr ON pr.id = pp.protein_id \
             WHERE pr.hgnc_id IN ({}) ORDER BY p.identifier",
            PATHWAY_COLUMNS,
            placeholders(hgnc_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pathways = stmt
            .query_map(params_from_iter(hgnc_ids.iter()), |row| self.row_to_pathway(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pathways)
    }

    /// Count all pathways
    pub fn count_pathways(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM pathway")
    }

    fn row_to_pathway(&self, row: &rusqlite::Row) -> rusqlite::Result<Pathway> {
        Ok(Pathway {
            id: row.get(0)?,
            identifier: row.get(1)?,
            name: row.get(2)?,
            species_id: row.get(3)?,
            revision: row.get(4)?,
        })
    }

    // ========== Protein Operations ==========

    /// Get a protein by Entrez id or create it.
    ///
    /// `hgnc_symbol` and `hgnc_id` may be `None` for identifiers the resolver
    /// could not map; the row is still created.
    pub fn get_or_create_protein(
        &self,
        entrez_id: &str,
        hgnc_symbol: Option<&str>,
        hgnc_id: Option<&str>,
    ) -> Result<Protein> {
        if let Some(protein) = self.get_protein_by_entrez_id(entrez_id)? {
            return Ok(protein);
        }

        self.conn.execute(
            "INSERT INTO protein (entrez_id, hgnc_symbol, hgnc_id) VALUES (?1, ?2, ?3)",
            params![entrez_id, hgnc_symbol, hgnc_id],
        )?;

        Ok(Protein {
            id: self.conn.last_insert_rowid(),
            entrez_id: entrez_id.to_string(),
            hgnc_symbol: hgnc_symbol.map(str::to_string),
            hgnc_id: hgnc_id.map(str::to_string),
        })
    }

    /// Proteins with one of the given HGNC ids, ordered by entrez id
    pub fn get_proteins_by_hgnc_ids(&self, hgnc_ids: &BTreeSet<String>) -> Result<Vec<Protein>> {
        if hgnc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM protein pr WHERE pr.hgnc_id IN ({}) ORDER BY pr.entrez_id",
            PROTEIN_COLUMNS,
            placeholders(hgnc_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let proteins = stmt
            .query_map(params_from_iter(hgnc_ids.iter()), |row| self.row_to_protein(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(proteins)
    }

    /// All proteins, ordered by entrez id
    pub fn list_proteins(&self) -> Result<Vec<Protein>> {
        let sql = format!("SELECT {} FROM protein pr ORDER BY pr.entrez_id", PROTEIN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let proteins = stmt
            .query_map([], |row| self.row_to_protein(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(proteins)
    }

    /// Count all proteins
    pub fn count_proteins(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM protein")
    }

    /// Count proteins stored without an HGNC mapping
    pub fn count_unresolved_proteins(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM protein WHERE hgnc_symbol IS NULL")
    }

    fn row_to_protein(&self, row: &rusqlite::Row) -> rusqlite::Result<Protein> {
        Ok(Protein {
            id: row.get(0)?,
            entrez_id: row.get(1)?,
            hgnc_symbol: row.get(2)?,
            hgnc_id: row.get(3)?,
        })
    }

    // ========== Membership Operations ==========

    /// Whether the pathway/protein link exists
    pub fn has_membership(&self, pathway: &Pathway, protein: &Protein) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM protein_pathway WHERE protein_id = ?1 AND pathway_id = ?2)",
            params![protein.id, pathway.id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Link a protein to a pathway. Returns `false` if the link already
    /// existed.
    pub fn add_membership(&self, pathway: &Pathway, protein: &Protein) -> Result<bool> {
        if self.has_membership(pathway, protein)? {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO protein_pathway (protein_id, pathway_id) VALUES (?1, ?2)",
            params![protein.id, pathway.id],
        )?;
        Ok(true)
    }

    /// Unlink a protein from a pathway. Returns `false` if there was no link.
    pub fn remove_membership(&self, pathway: &Pathway, protein: &Protein) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM protein_pathway WHERE protein_id = ?1 AND pathway_id = ?2",
            params![protein.id, pathway.id],
        )?;
        Ok(removed > 0)
    }

    /// Number of members of a pathway
    pub fn count_members(&self, pathway: &Pathway) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM protein_pathway WHERE pathway_id = ?1",
            [pathway.id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Count all membership links
    pub fn count_memberships(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM protein_pathway")
    }

    /// Pathway identifier → member count, empty pathways included
    pub fn pathway_size_distribution(&self) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.identifier, COUNT(pp.protein_id) FROM pathway p \
             LEFT JOIN protein_pathway pp ON pp.pathway_id = p.id \
             GROUP BY p.id ORDER BY p.identifier",
        )?;

        let sizes = stmt
            .query_map([], |row| {
                let identifier: String = row.get(0)?;
                let size: i64 = row.get(1)?;
                Ok((identifier, size as usize))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(sizes)
    }

    /// Every resolved symbol that is a member of at least one pathway
    pub fn all_symbols(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT pr.hgnc_symbol FROM protein pr \
             JOIN protein_pathway pp ON pp.protein_id = pr.id \
             WHERE pr.hgnc_symbol IS NOT NULL",
        )?;

        let symbols = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;

        Ok(symbols)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            species: self.count("SELECT COUNT(*) FROM species")?,
            pathways: self.count_pathways()?,
            proteins: self.count_proteins()?,
            unresolved_proteins: self.count_unresolved_proteins()?,
            memberships: self.count_memberships()?,
        })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl SchemaLifecycle for SqliteStore {
    fn create_all(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    fn drop_all(&self) -> Result<()> {
        for table in schema::TABLES {
            tracing::debug!("Dropping table {}", table);
            self.conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        for table in schema::TABLES {
            self.conn.execute(&format!("DELETE FROM {}", table), [])?;
        }
        Ok(())
    }

    fn is_populated(&self) -> Result<bool> {
        Ok(self.count_pathways()? > 0)
    }
}

impl GeneSetExport for SqliteStore {
    fn export_gene_sets(&self) -> Result<BTreeMap<String, GeneSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.identifier, p.name, pr.hgnc_symbol FROM pathway p \
             LEFT JOIN protein_pathway pp ON pp.pathway_id = p.id \
             LEFT JOIN protein pr ON pr.id = pp.protein_id \
             ORDER BY p.identifier",
        )?;

        let mut gene_sets: BTreeMap<String, GeneSet> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        for row in rows {
            let (identifier, name, symbol) = row?;
            let gene_set = gene_sets.entry(identifier).or_insert_with(|| GeneSet {
                name,
                symbols: BTreeSet::new(),
            });
            if let Some(symbol) = symbol {
                gene_set.symbols.insert(symbol);
            }
        }

        Ok(gene_sets)
    }

    fn pathway_names_to_ids(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut names: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pathway in self.list_pathways()? {
            names.entry(pathway.name).or_default().push(pathway.identifier);
        }
        Ok(names)
    }
}

impl MembershipQuery for SqliteStore {
    fn get_pathway_by_identifier(&self, identifier: &str) -> Result<Option<Pathway>> {
        let sql = format!("SELECT {} FROM pathway p WHERE p.identifier = ?1", PATHWAY_COLUMNS);
        self.conn
            .query_row(&sql, [identifier], |row| self.row_to_pathway(row))
            .optional()
            .map_err(Into::into)
    }

    fn find_pathways_by_name(&self, name: &str) -> Result<Vec<Pathway>> {
        let sql = format!(
            "SELECT {} FROM pathway p WHERE p.name = ?1 ORDER BY p.identifier",
            PATHWAY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pathways = stmt
            .query_map([name], |row| self.row_to_pathway(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pathways)
    }

    fn get_protein_by_entrez_id(&self, entrez_id: &str) -> Result<Option<Protein>> {
        let sql = format!("SELECT {} FROM protein pr WHERE pr.entrez_id = ?1", PROTEIN_COLUMNS);
        self.conn
            .query_row(&sql, [entrez_id], |row| self.row_to_protein(row))
            .optional()
            .map_err(Into::into)
    }

    fn get_protein_by_symbol(&self, symbol: &str) -> Result<Option<Protein>> {
        let sql = format!(
            "SELECT {} FROM protein pr WHERE pr.hgnc_symbol = ?1 ORDER BY pr.entrez_id LIMIT 1",
            PROTEIN_COLUMNS
        );
        self.conn
            .query_row(&sql, [symbol], |row| self.row_to_protein(row))
            .optional()
            .map_err(Into::into)
    }

    fn get_protein_by_hgnc_id(&self, hgnc_id: &str) -> Result<Option<Protein>> {
        let sql = format!(
            "SELECT {} FROM protein pr WHERE pr.hgnc_id = ?1 ORDER BY pr.entrez_id LIMIT 1",
            PROTEIN_COLUMNS
        );
        self.conn
            .query_row(&sql, [hgnc_id], |row| self.row_to_protein(row))
            .optional()
            .map_err(Into::into)
    }

    fn get_proteins_by_symbols(&self, symbols: &BTreeSet<String>) -> Result<Vec<Protein>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM protein pr WHERE pr.hgnc_symbol IN ({}) ORDER BY pr.entrez_id",
            PROTEIN_COLUMNS,
            placeholders(symbols.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let proteins = stmt
            .query_map(params_from_iter(symbols.iter()), |row| self.row_to_protein(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(proteins)
    }

    fn proteins_of_pathway(&self, pathway: &Pathway) -> Result<Vec<Protein>> {
        let sql = format!(
            "SELECT {} FROM protein pr \
             JOIN protein_pathway pp ON pp.protein_id = pr.id \
             WHERE pp.pathway_id = ?1 ORDER BY pr.entrez_id",
            PROTEIN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let proteins = stmt
            .query_map([pathway.id], |row| self.row_to_protein(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(proteins)
    }

    fn pathways_of_protein(&self, protein: &Protein) -> Result<Vec<Pathway>> {
        let sql = format!(
            "SELECT {} FROM pathway p \
             JOIN protein_pathway pp ON pp.pathway_id = p.id \
             WHERE pp.protein_id = ?1 ORDER BY p.identifier",
            PATHWAY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pathways = stmt
            .query_map([protein.id], |row| self.row_to_pathway(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(pathways)
    }
}

/// `?1, ?2, ...` for an IN clause
fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub species: usize,
    pub pathways: usize,
    pub proteins: usize,
    pub unresolved_proteins: usize,
    pub memberships: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Species: {}", self.species)?;
        writeln!(f, "  Pathways: {}", self.pathways)?;
        writeln!(f, "  Proteins: {} ({} without HGNC mapping)", self.proteins, self.unresolved_proteins)?;
        writeln!(f, "  Memberships: {}", self.memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pathway() -> (SqliteStore, Pathway) {
        let store = SqliteStore::open_in_memory().unwrap();
        let species = store.get_or_create_species("Homo sapiens", Some("9606")).unwrap();
        let pathway = store
            .get_or_create_pathway("WP1604", "Codeine and Morphine Metabolism", Some(&species), Some("r94880"))
            .unwrap();
        (store, pathway)
    }

    #[test]
    fn test_get_or_create_pathway_is_idempotent() {
        let (store, pathway) = store_with_pathway();

        let again = store
            .get_or_create_pathway("WP1604", "Some other name", None, None)
            .unwrap();
        assert_eq!(again, pathway);
        assert_eq!(store.count_pathways().unwrap(), 1);
    }

    #[test]
    fn test_get_or_create_protein_keeps_unresolved_rows() {
        let store = SqliteStore::open_in_memory().unwrap();

        let protein = store.get_or_create_protein("999999999", None, None).unwrap();
        assert!(!protein.is_resolved());

        let again = store.get_or_create_protein("999999999", None, None).unwrap();
        assert_eq!(again.id, protein.id);
        assert_eq!(store.count_proteins().unwrap(), 1);
        assert_eq!(store.count_unresolved_proteins().unwrap(), 1);
    }

    #[test]
    fn test_add_membership_is_idempotent() {
        let (store, pathway) = store_with_pathway();
        let protein = store
            .get_or_create_protein("7363", Some("UGT2B4"), Some("HGNC:12553"))
            .unwrap();

        assert!(store.add_membership(&pathway, &protein).unwrap());
        assert!(!store.add_membership(&pathway, &protein).unwrap());
        assert_eq!(store.count_memberships().unwrap(), 1);
        assert_eq!(store.count_members(&pathway).unwrap(), 1);

        assert!(store.remove_membership(&pathway, &protein).unwrap());
        assert!(!store.remove_membership(&pathway, &protein).unwrap());
    }

    #[test]
    fn test_duplicate_names_stay_separate() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.get_or_create_pathway("WP20", "Glycolysis", None, None).unwrap();
        store.get_or_create_pathway("WP10", "Glycolysis", None, None).unwrap();

        let all = store.find_pathways_by_name("Glycolysis").unwrap();
        let ids: Vec<_> = all.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["WP10", "WP20"]);

        let first = store.get_pathway_by_name("Glycolysis").unwrap().unwrap();
        assert_eq!(first.identifier, "WP10");
        assert!(store.get_pathway_by_name("Gluconeogenesis").unwrap().is_none());

        let names = store.pathway_names_to_ids().unwrap();
        assert_eq!(names["Glycolysis"], vec!["WP10", "WP20"]);
    }

    #[test]
    fn test_lookups_in_both_directions() {
        let (store, pathway) = store_with_pathway();
        let a = store.get_or_create_protein("7364", Some("UGT2B7"), Some("HGNC:12554")).unwrap();
        let b = store.get_or_create_protein("7363", Some("UGT2B4"), Some("HGNC:12553")).unwrap();
        let other = store.get_or_create_pathway("WP536", "Calcium Regulation", None, None).unwrap();
        store.add_membership(&pathway, &a).unwrap();
        store.add_membership(&pathway, &b).unwrap();
        store.add_membership(&other, &b).unwrap();

        let members = store.proteins_of_pathway(&pathway).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].entrez_id, "7363");

        let pathways = store.pathways_of_protein(&b).unwrap();
        let ids: Vec<_> = pathways.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["WP1604", "WP536"]);

        let by_hgnc: BTreeSet<String> = ["HGNC:12553".to_string()].into();
        assert_eq!(store.get_pathways_by_hgnc_ids(&by_hgnc).unwrap().len(), 2);
        assert_eq!(store.get_proteins_by_hgnc_ids(&by_hgnc).unwrap().len(), 1);
        assert_eq!(store.get_protein_by_hgnc_id("HGNC:12554").unwrap().unwrap().id, a.id);
    }

    #[test]
    fn test_symbol_lookups() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.get_or_create_protein("7364", Some("UGT2B7"), None).unwrap();
        store.get_or_create_protein("7363", Some("UGT2B4"), None).unwrap();

        assert!(store.get_protein_by_symbol("UGT2B7").unwrap().is_some());
        assert!(store.get_protein_by_symbol("CDKN1A").unwrap().is_none());

        let query: BTreeSet<String> = ["UGT2B7", "UGT2B4", "CDKN1A"].iter().map(|s| s.to_string()).collect();
        assert_eq!(store.get_proteins_by_symbols(&query).unwrap().len(), 2);
        assert!(store.get_proteins_by_symbols(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_enumerations_and_export() {
        let (store, pathway) = store_with_pathway();
        let resolved = store.get_or_create_protein("7363", Some("UGT2B4"), None).unwrap();
        let unresolved = store.get_or_create_protein("999", None, None).unwrap();
        store.add_membership(&pathway, &resolved).unwrap();
        store.add_membership(&pathway, &unresolved).unwrap();
        store.get_or_create_pathway("WP0", "Empty", None, None).unwrap();

        let sizes = store.pathway_size_distribution().unwrap();
        assert_eq!(sizes["WP1604"], 2);
        assert_eq!(sizes["WP0"], 0);

        let symbols = store.all_symbols().unwrap();
        assert_eq!(symbols.into_iter().collect::<Vec<_>>(), vec!["UGT2B4"]);

        let gene_sets = store.export_gene_sets().unwrap();
        assert_eq!(gene_sets.len(), 2);
        assert_eq!(gene_sets["WP1604"].symbols.len(), 1);
        assert!(gene_sets["WP0"].symbols.is_empty());

        assert_eq!(store.list_pathways().unwrap().len(), 2);
        assert_eq!(store.list_proteins().unwrap().len(), 2);
    }

    #[test]
    fn test_search_by_name_fragment() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.get_or_create_pathway("WP1", "Glycolysis and Gluconeogenesis", None, None).unwrap();
        store.get_or_create_pathway("WP2", "TCA Cycle", None, None).unwrap();
        store.get_or_create_pathway("WP3", "Glycogen Metabolism", None, None).unwrap();

        assert_eq!(store.search_pathways_by_name("Glyco", None).unwrap().len(), 2);
        assert_eq!(store.search_pathways_by_name("Glyco", Some(1)).unwrap().len(), 1);
        assert!(store.search_pathways_by_name("Krebs", None).unwrap().is_empty());
        assert_eq!(store.search_pathways_by_name("glyco", None).unwrap().len(), 2);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.get_or_create_pathway("WP1", "100% Glycolysis", None, None).unwrap();
        store.get_or_create_pathway("WP2", "Glycolysis", None, None).unwrap();
        store.get_or_create_pathway("WP3", "Fatty_acid Synthesis", None, None).unwrap();
        store.get_or_create_pathway("WP4", "Fatty acid Beta Oxidation", None, None).unwrap();

        let percent = store.search_pathways_by_name("%", None).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].identifier, "WP1");

        let underscore = store.search_pathways_by_name("y_a", None).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].identifier, "WP3");
    }

    #[test]
    fn test_rollback_discards_uncommitted_rows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.begin_transaction().unwrap();
        store.get_or_create_pathway("WP1", "Committed", None, None).unwrap();
        store.commit().unwrap();

        store.begin_transaction().unwrap();
        store.get_or_create_pathway("WP2", "Rolled back", None, None).unwrap();
        store.rollback().unwrap();

        assert_eq!(store.count_pathways().unwrap(), 1);
    }

    #[test]
    fn test_schema_lifecycle() {
        let (store, _) = store_with_pathway();
        assert!(store.is_populated().unwrap());

        store.clear_all().unwrap();
        assert!(!store.is_populated().unwrap());

        store.drop_all().unwrap();
        store.create_all().unwrap();
        assert_eq!(store.stats().unwrap().pathways, 0);
    }
}
