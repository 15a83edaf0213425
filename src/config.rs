use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current WikiPathways human GMT release, used by `init`
pub const DEFAULT_SOURCE: &str =
    "http://data.wikipathways.org/current/gmt/wikipathways-20180510-gmt-Homo_sapiens.gmt";

/// HGNC complete set, used by `init`
pub const DEFAULT_HGNC: &str =
    "https://storage.googleapis.com/public-download-files/hgnc/tsv/tsv/hgnc_complete_set.txt";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GmtdbConfig {
    pub database: Option<String>,
    pub hgnc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Taxonomy id → GMT location
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub species: BTreeMap<String, String>,
}

impl GmtdbConfig {
    /// Config written by `init`
    pub fn starter() -> Self {
        Self {
            database: Some(default_database_path_in(Path::new(".")).display().to_string()),
            hgnc: Some(DEFAULT_HGNC.to_string()),
            sources: vec![DEFAULT_SOURCE.to_string()],
            species: BTreeMap::new(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("gmtdb.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".gmtdb").join("gmtdb.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GmtdbConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: GmtdbConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &GmtdbConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
