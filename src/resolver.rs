//! Identifier resolution - Entrez gene id → HGNC symbol / HGNC id
//!
//! The resolver is a read-only data source. The population pipeline only ever
//! asks for the bulk [`MappingTables`] once per run; the per-id methods exist
//! for ad-hoc lookups and tests.

use std::collections::HashMap;
use serde::Deserialize;
use crate::fetch::Fetcher;
use crate::{Error, Result};

/// Bidirectional mapping capability between the primary (Entrez) and the
/// secondary (HGNC) namespace.
pub trait IdentifierResolver {
    /// HGNC symbol for an Entrez id
    fn primary_to_symbol(&self, primary_id: &str) -> Option<String>;

    /// HGNC id for an Entrez id
    fn primary_to_secondary_id(&self, primary_id: &str) -> Option<String>;

    /// Full mapping tables, fetched up front for a whole population run
    fn mapping_tables(&self) -> Result<MappingTables>;
}

/// Outcome of resolving one primary id. Unresolved is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        symbol: String,
        secondary_id: Option<String>,
    },
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// In-memory Entrez → symbol and Entrez → HGNC id tables.
#[derive(Debug, Clone, Default)]
pub struct MappingTables {
    symbols: HashMap<String, String>,
    secondary_ids: HashMap<String, String>,
}

impl MappingTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping. Later inserts for the same primary id win.
    pub fn insert(
        &mut self,
        primary_id: impl Into<String>,
        symbol: impl Into<String>,
        secondary_id: Option<String>,
    ) {
        let primary_id = primary_id.into();
        if let Some(secondary_id) = secondary_id {
            self.secondary_ids.insert(primary_id.clone(), secondary_id);
        }
        self.symbols.insert(primary_id, symbol.into());
    }

    /// Resolve a primary id. An id is resolved when it has a symbol; the
    /// secondary id may still be absent.
    pub fn resolve(&self, primary_id: &str) -> Resolution {
        match self.symbols.get(primary_id) {
            Some(symbol) => Resolution::Resolved {
                symbol: symbol.clone(),
                secondary_id: self.secondary_ids.get(primary_id).cloned(),
            },
            None => Resolution::Unresolved,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl IdentifierResolver for MappingTables {
    fn primary_to_symbol(&self, primary_id: &str) -> Option<String> {
        self.symbols.get(primary_id).cloned()
    }

    fn primary_to_secondary_id(&self, primary_id: &str) -> Option<String> {
        self.secondary_ids.get(primary_id).cloned()
    }

    fn mapping_tables(&self) -> Result<MappingTables> {
        Ok(self.clone())
    }
}

const REQUIRED_COLUMNS: &[&str] = &["hgnc_id", "symbol", "entrez_id"];

/// The HGNC complete-set columns gmtdb reads; the rest are ignored.
#[derive(Debug, Deserialize)]
struct HgncRecord {
    hgnc_id: Option<String>,
    symbol: Option<String>,
    entrez_id: Option<String>,
}

/// Mappings read from the HGNC complete set TSV.
///
/// Columns are located by header name, so extra or reordered columns in newer
/// downloads are fine. Rows without an Entrez id carry nothing to map and
/// are skipped.
#[derive(Debug, Clone)]
pub struct HgncTable {
    tables: MappingTables,
}

impl HgncTable {
    /// Fetch and parse the TSV at `location`.
    pub fn load(fetcher: &dyn Fetcher, location: &str) -> Result<Self> {
        let content = fetcher.fetch(location)?;
        Self::from_tsv(&content)
    }

    /// Parse TSV content with a header row.
    pub fn from_tsv(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Error::Resolver(format!("HGNC table header: {}", e)))?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(Error::Resolver(format!("HGNC table has no '{}' column", column)));
            }
        }

        let mut tables = MappingTables::new();
        let mut skipped = 0usize;

        for (row, record) in reader.deserialize::<HgncRecord>().enumerate() {
            // +2: one-based, after the header line
            let record = record.map_err(|e| Error::Resolver(format!("HGNC table row {}: {}", row + 2, e)))?;
            match (record.entrez_id, record.symbol) {
                (Some(entrez_id), Some(symbol)) => tables.insert(entrez_id, symbol, record.hgnc_id),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} HGNC rows without an Entrez id or symbol", skipped);
        }
        tracing::info!("Loaded {} Entrez → HGNC mappings", tables.len());

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }
}

impl IdentifierResolver for HgncTable {
    fn primary_to_symbol(&self, primary_id: &str) -> Option<String> {
        self.tables.primary_to_symbol(primary_id)
    }

    fn primary_to_secondary_id(&self, primary_id: &str) -> Option<String> {
        self.tables.primary_to_secondary_id(primary_id)
    }

    fn mapping_tables(&self) -> Result<MappingTables> {
        Ok(self.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HGNC_FIXTURE: &str = include_str!("../tests/fixtures/hgnc_complete_set_subset.tsv");

    #[test]
    fn test_resolve_known_and_unknown() {
        let mut tables = MappingTables::new();
        tables.insert("7363", "UGT2B4", Some("HGNC:12553".to_string()));

        assert_eq!(
            tables.resolve("7363"),
            Resolution::Resolved {
                symbol: "UGT2B4".to_string(),
                secondary_id: Some("HGNC:12553".to_string()),
            }
        );
        assert_eq!(tables.resolve("999"), Resolution::Unresolved);
        assert!(!tables.resolve("999").is_resolved());
    }

    #[test]
    fn test_symbol_without_secondary_id_still_resolves() {
        let mut tables = MappingTables::new();
        tables.insert("1", "ABC1", None);

        assert!(tables.resolve("1").is_resolved());
        assert_eq!(tables.primary_to_secondary_id("1"), None);
    }

    #[test]
    fn test_hgnc_fixture() {
        let table = HgncTable::from_tsv(HGNC_FIXTURE).unwrap();

        assert_eq!(table.primary_to_symbol("7364").as_deref(), Some("UGT2B7"));
        assert_eq!(table.primary_to_secondary_id("7364").as_deref(), Some("HGNC:12554"));
        assert_eq!(table.primary_to_symbol("999999999"), None);
        // A1BG-AS1 has no Entrez id in the fixture
        assert_eq!(table.tables().len(), 17);
    }

    #[test]
    fn test_header_driven_columns() {
        let tsv = "entrez_id\tstatus\tsymbol\thgnc_id\n1026\tApproved\tCDKN1A\tHGNC:1784\n";
        let table = HgncTable::from_tsv(tsv).unwrap();
        assert_eq!(table.primary_to_symbol("1026").as_deref(), Some("CDKN1A"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = HgncTable::from_tsv("hgnc_id\tsymbol\nHGNC:1\tA\n").unwrap_err();
        assert!(matches!(err, Error::Resolver(_)));

        let err = HgncTable::from_tsv("").unwrap_err();
        assert!(matches!(err, Error::Resolver(_)));
    }

    #[test]
    fn test_quoted_field_with_tab_keeps_columns_aligned() {
        let tsv = "hgnc_id\tname\tsymbol\tentrez_id\n\
                   HGNC:1784\t\"cyclin dependent\tkinase inhibitor 1A\"\tCDKN1A\t1026\n\
                   HGNC:8903\t6-phosphogluconolactonase\tPGLS\t25796\n";
        let table = HgncTable::from_tsv(tsv).unwrap();

        assert_eq!(table.primary_to_symbol("1026").as_deref(), Some("CDKN1A"));
        assert_eq!(table.primary_to_secondary_id("1026").as_deref(), Some("HGNC:1784"));
        assert_eq!(table.primary_to_symbol("25796").as_deref(), Some("PGLS"));
    }

    #[test]
    fn test_short_rows_and_blank_ids_are_skipped() {
        let tsv = "hgnc_id\tsymbol\tentrez_id\nHGNC:1\tA1BG-AS1\t\nHGNC:2\tTRUNC\nHGNC:1784\tCDKN1A\t1026\n";
        let table = HgncTable::from_tsv(tsv).unwrap();
        assert_eq!(table.tables().len(), 1);
    }
}
