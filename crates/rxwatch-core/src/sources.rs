//! Per-source configuration loaded from `config/sources.yaml`.
//!
//! Each adapter receives exactly one immutable [`SourceSpec`] at
//! construction. Selectors and extraction logic live in the adapters
//! themselves; the YAML carries only identity, endpoints, and filter
//! keywords.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Which collection strategy a source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// HTML listing page with per-alert detail pages.
    ListingWithDetailPages,
    /// A JSON API queried directly.
    JsonApi,
    /// A JSON open-data feed fetched in one request.
    JsonFeed,
}

/// One regulatory source as configured in `sources.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Stable provenance id, e.g. `NAFDAC_NG`. First part of every record id.
    pub source_id: String,
    pub source_org: String,
    #[serde(default)]
    pub source_country: Option<String>,
    pub kind: SourceKind,
    /// Listing page for HTML sources; informational URL for API sources.
    pub base_url: String,
    /// API/feed endpoint for [`SourceKind::JsonApi`] / [`SourceKind::JsonFeed`].
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Keywords for the oncology gate. Empty list disables the gate.
    #[serde(default)]
    pub oncology_keywords: Vec<String>,
    #[serde(default)]
    pub therapeutic_category: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceSpec>,
}

impl SourcesFile {
    /// Looks up a source by its provenance id.
    #[must_use]
    pub fn get(&self, source_id: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.source_id == source_id)
    }
}

/// Load and validate the sources configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, if a source
/// id repeats, or if an API-kind source has no endpoint.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file = parse_sources(&content)?;
    tracing::debug!(path = %path.display(), sources = file.sources.len(), "sources loaded");
    Ok(file)
}

fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let file: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&file)?;
    Ok(file)
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    if file.sources.is_empty() {
        return Err(ConfigError::SourcesFileInvalid(
            "no sources configured".to_owned(),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for spec in &file.sources {
        if !seen.insert(spec.source_id.as_str()) {
            return Err(ConfigError::SourcesFileInvalid(format!(
                "duplicate source_id: {}",
                spec.source_id
            )));
        }
        let needs_endpoint = matches!(spec.kind, SourceKind::JsonApi | SourceKind::JsonFeed);
        if needs_endpoint && spec.api_endpoint.is_none() {
            return Err(ConfigError::SourcesFileInvalid(format!(
                "source {} is an API source but has no api_endpoint",
                spec.source_id
            )));
        }
    }
    Ok(())
}
