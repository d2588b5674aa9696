use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ovhcat_catalog::{CatalogChanges, CatalogRepository, CatalogSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content of the store file: one catalog per node.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredCatalogs {
    #[serde(default)]
    pub nodes: BTreeMap<String, CatalogSnapshot>,
}

/// Catalog repository backed by a single JSON file.
///
/// The file is rewritten whole on each save, through a sibling temporary
/// file renamed over the old one.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    pub async fn read(&self) -> Result<StoredCatalogs> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => serde_json::from_str(&body)
                .with_context(|| format!("failed to decode {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredCatalogs::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    async fn write(&self, catalogs: &StoredCatalogs) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(catalogs)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body)
            .await
            .with_context(|| format!("failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

#[async_trait]
impl CatalogRepository for JsonFileRepository {
    async fn load(&self, node: &str) -> Result<CatalogSnapshot> {
        let mut catalogs = self.read().await?;
        Ok(catalogs.nodes.remove(node).unwrap_or_default())
    }

    async fn save(&mut self, node: &str, changes: CatalogChanges) -> Result<()> {
        if changes.is_empty() && self.path.exists() {
            debug!(path = %self.path.display(), "catalog unchanged");
            return Ok(());
        }
        let mut catalogs = self.read().await?;
        catalogs
            .nodes
            .entry(node.to_string())
            .or_default()
            .apply(changes);
        self.write(&catalogs).await
    }
}
