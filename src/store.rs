use crate::catalog::Catalog;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Read and parse a catalog file
pub async fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;

    Catalog::from_json(&content)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))
}

/// Write a catalog as JSON indented with two spaces
pub async fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let json = catalog
        .to_pretty_json()
        .context("Failed to serialize catalog")?;

    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write catalog {}", path.display()))
}
