//! Source retrieval
//!
//! Turns a location (local path, `file://` URI or `http(s)://` URL) into the
//! raw text of a GMT or mapping file. One best-effort read per location.

use std::path::Path;
use crate::{Error, Result};

/// Anything that can hand back the text behind a location.
pub trait Fetcher {
    /// Fetch the full content at `location`.
    ///
    /// A missing resource (HTTP 404 or absent local file) is reported as
    /// [`Error::NotFound`]; every other failure keeps its own variant.
    fn fetch(&self, location: &str) -> Result<String>;
}

/// Default fetcher: blocking HTTP for URLs, filesystem for everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceFetcher;

impl SourceFetcher {
    pub fn new() -> Self {
        Self
    }

    fn fetch_url(&self, url: &str) -> Result<String> {
        tracing::info!("Fetching {}", url);
        let response = reqwest::blocking::get(url)?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound { location: url.to_string() });
        }
        if !status.is_success() {
            return Err(Error::Fetch(format!("{} returned HTTP {}", url, status)));
        }

        Ok(response.text()?)
    }

    fn fetch_file(&self, path: &Path) -> Result<String> {
        tracing::debug!("Reading {}", path.display());
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                location: path.display().to_string(),
            },
            _ => Error::Io(e),
        })
    }
}

impl Fetcher for SourceFetcher {
    fn fetch(&self, location: &str) -> Result<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_url(location)
        } else if let Some(path) = location.strip_prefix("file://") {
            self.fetch_file(Path::new(path))
        } else {
            self.fetch_file(Path::new(location))
        }
    }
}
