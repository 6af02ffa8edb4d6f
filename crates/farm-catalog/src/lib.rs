#![deny(warnings)]

//! Loading substitute crop/soil/meal catalogs from YAML or JSON.
//!
//! Every loaded catalog is validated before it is handed out, so callers can
//! pass it straight to the calculator.

use farm_core::{validate_catalog, Catalog, ValidationError};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Text formats a catalog can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogFormat {
    Yaml,
    Json,
}

impl CatalogFormat {
    /// Pick a format from a file extension (`yaml`, `yml`, `json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(CatalogFormat::Yaml),
            "json" => Some(CatalogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported catalog file: {0}")]
    UnsupportedFormat(String),
    #[error("invalid catalog: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for CatalogLoadError {
    fn from(e: std::io::Error) -> Self {
        CatalogLoadError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogLoadError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogLoadError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(e: serde_json::Error) -> Self {
        CatalogLoadError::Parse(e.to_string())
    }
}

/// Parse and validate a catalog from text.
pub fn load_catalog_str(text: &str, format: CatalogFormat) -> Result<Catalog, CatalogLoadError> {
    let catalog: Catalog = match format {
        CatalogFormat::Yaml => serde_yaml::from_str(text)?,
        CatalogFormat::Json => serde_json::from_str(text)?,
    };
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Read, parse and validate a catalog file; the format follows the extension.
pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogLoadError> {
    let path = path.as_ref();
    let format = CatalogFormat::from_path(path)
        .ok_or_else(|| CatalogLoadError::UnsupportedFormat(path.display().to_string()))?;
    let text = fs::read_to_string(path)?;
    let catalog = load_catalog_str(&text, format)?;
    info!(
        path = %path.display(),
        crops = catalog.crops.len(),
        soils = catalog.soils.len(),
        meals = catalog.meals.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Render a catalog as YAML, e.g. as a starting point for a custom one.
pub fn to_yaml(catalog: &Catalog) -> Result<String, CatalogLoadError> {
    serde_yaml::to_string(catalog).map_err(CatalogLoadError::from)
}
