//! GMT parser
//!
//! One pathway per line, tab separated:
//!
//! ```text
//! <name>%<release>%<id>%<species> \t <url>/<id>_<revision> \t <gene> \t <gene> ...
//! ```
//!
//! Examples:
//! - `Codeine and Morphine Metabolism%WikiPathways_20180510%WP1604%Homo sapiens`
//! - `http://www.wikipathways.org/instance/WP1604_r94880`

use serde::{Deserialize, Serialize};
use crate::fetch::Fetcher;
use crate::{Error, Result};

/// Prefix WikiPathways puts in front of the release date in the name field.
const RELEASE_PREFIX: &str = "WikiPathways_";

/// A single parsed GMT line. Gene ids are kept as raw strings; resolution
/// happens later in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmtRecord {
    /// Pathway display name
    pub name: String,
    /// Species display name (last `%` segment), when the line carries one
    pub species: Option<String>,
    /// Canonical pathway identifier, e.g. `WP1604`
    pub identifier: String,
    /// Pathway revision, e.g. `r94880`
    pub revision: Option<String>,
    /// Release/version tag of the file the line came from, e.g. `20180510`
    pub release: Option<String>,
    /// Member gene identifiers in file order
    pub genes: Vec<String>,
}

/// Parse GMT content into records, preserving line order.
///
/// Blank lines are skipped. Any other line that does not carry at least a
/// name and an identifier aborts the parse.
pub fn parse_gmt(content: &str) -> Result<Vec<GmtRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(line, idx + 1)?);
    }

    Ok(records)
}

/// Fetch a location and parse it.
pub fn parse_gmt_source(fetcher: &dyn Fetcher, location: &str) -> Result<Vec<GmtRecord>> {
    let content = fetcher.fetch(location)?;
    let records = parse_gmt(&content)?;
    tracing::info!("Parsed {} pathways from {}", records.len(), location);
    Ok(records)
}

/// Parse a single line. `line_no` is 1-based and only used for errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<GmtRecord> {
    let mut fields = line.split('\t').map(str::trim);

    let malformed = |reason: &str| Error::MalformedLine {
        line: line_no,
        reason: reason.to_string(),
    };

    let description = fields.next().filter(|f| !f.is_empty())
        .ok_or_else(|| malformed("missing pathway name field"))?;
    let locator = fields.next()
        .ok_or_else(|| malformed("expected at least a name and an identifier field"))?;

    let (name, release, species) = split_description(description);
    if name.is_empty() {
        return Err(malformed("empty pathway name"));
    }

    let (identifier, revision) = split_locator(locator);
    if identifier.is_empty() {
        return Err(malformed("empty pathway identifier"));
    }

    let genes = fields
        .filter(|gene| !gene.is_empty())
        .map(str::to_string)
        .collect();

    Ok(GmtRecord {
        name: name.to_string(),
        species: species.map(str::to_string),
        identifier: identifier.to_string(),
        revision: revision.map(str::to_string),
        release: release.map(normalize_release),
        genes,
    })
}

/// Split `<name>%<release>%...%<species>` into (name, release, species).
fn split_description(description: &str) -> (&str, Option<&str>, Option<&str>) {
    let segments: Vec<&str> = description.split('%').map(str::trim).collect();
    let non_empty = |s: &&str| !s.is_empty();

    match segments.as_slice() {
        [name] => (*name, None, None),
        [name, release] => (*name, Some(*release).filter(non_empty), None),
        [name, release, .., species] => (
            *name,
            Some(*release).filter(non_empty),
            Some(*species).filter(non_empty),
        ),
        [] => ("", None, None),
    }
}

/// Take the last path segment of a URL (or a bare id) and split off the
/// `_<revision>` suffix.
fn split_locator(locator: &str) -> (&str, Option<&str>) {
    let tail = locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator);

    match tail.split_once('_') {
        Some((id, revision)) if !revision.is_empty() => (id, Some(revision)),
        Some((id, _)) => (id, None),
        None => (tail, None),
    }
}

fn normalize_release(release: &str) -> String {
    release
        .strip_prefix(RELEASE_PREFIX)
        .unwrap_or(release)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../tests/fixtures/wikipathways-20180510-gmt-Homo_sapiens.gmt");

    #[test]
    fn test_parse_full_line() {
        let line = "Codeine and Morphine Metabolism%WikiPathways_20180510%WP1604%Homo sapiens\t\
                    http://www.wikipathways.org/instance/WP1604_r94880\t7364\t7363";
        let record = parse_line(line, 1).unwrap();

        assert_eq!(record.name, "Codeine and Morphine Metabolism");
        assert_eq!(record.species.as_deref(), Some("Homo sapiens"));
        assert_eq!(record.identifier, "WP1604");
        assert_eq!(record.revision.as_deref(), Some("r94880"));
        assert_eq!(record.release.as_deref(), Some("20180510"));
        assert_eq!(record.genes, vec!["7364", "7363"]);
    }

    #[test]
    fn test_parse_short_name_variant() {
        let record = parse_line("Glycolysis%v2\tWP534\t3098", 1).unwrap();

        assert_eq!(record.name, "Glycolysis");
        assert_eq!(record.release.as_deref(), Some("v2"));
        assert_eq!(record.species, None);
        assert_eq!(record.identifier, "WP534");
        assert_eq!(record.revision, None);
    }

    #[test]
    fn test_genes_are_trimmed() {
        let record = parse_line("Name\tWP1\t 10 \t20\t\t 30\r", 1).unwrap();
        assert_eq!(record.genes, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_pathway_without_genes() {
        let record = parse_line("Empty%20200110%WP9%Mus musculus\tWP9_r1", 1).unwrap();
        assert!(record.genes.is_empty());
        assert_eq!(record.species.as_deref(), Some("Mus musculus"));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let content = "A%x%WP1%Homo sapiens\tWP1\t1\njust-a-name\n";
        match parse_gmt(content) {
            Err(Error::MalformedLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed line error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_identifier_is_malformed() {
        assert!(matches!(
            parse_line("Name%x%y%Homo sapiens\t\t1\t2", 3),
            Err(Error::MalformedLine { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_gmt("").unwrap().is_empty());
        assert!(parse_gmt("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_fixture_order_is_stable() {
        let records = parse_gmt(FIXTURE).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["WP1604", "WP536", "WP3596", "WP2333", "WP4022"]);
        assert!(records.iter().all(|r| r.release.as_deref() == Some("20180510")));
    }
}
