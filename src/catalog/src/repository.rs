use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Category, Price, PriceTerm, Region, ResourceType};

/// Every entity of one catalog namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub terms: Vec<PriceTerm>,
    #[serde(default)]
    pub types: Vec<ResourceType>,
    #[serde(default)]
    pub prices: Vec<Price>,
}

/// Entities created or modified by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogChanges {
    pub regions: Vec<Region>,
    pub terms: Vec<PriceTerm>,
    pub types: Vec<ResourceType>,
    pub prices: Vec<Price>,
}

impl CatalogChanges {
    pub fn len(&self) -> usize {
        self.regions.len() + self.terms.len() + self.types.len() + self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogSnapshot {
    /// Upsert the changes by code; types and prices are keyed per category.
    pub fn apply(&mut self, changes: CatalogChanges) {
        upsert(&mut self.regions, changes.regions, |r| r.code.clone());
        upsert(&mut self.terms, changes.terms, |t| t.code.clone());
        upsert(&mut self.types, changes.types, |t| (t.category(), t.code.clone()));
        upsert(&mut self.prices, changes.prices, |p| (p.category(), p.code.clone()));
    }

    pub fn count_types(&self, category: Category) -> usize {
        self.types.iter().filter(|t| t.category() == category).count()
    }

    pub fn count_prices(&self, category: Category) -> usize {
        self.prices.iter().filter(|p| p.category() == category).count()
    }
}

fn upsert<T, K, F>(stored: &mut Vec<T>, changes: Vec<T>, key: F)
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = stored
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item), i))
        .collect();
    for item in changes {
        let k = key(&item);
        if let Some(&i) = index.get(&k) {
            stored[i] = item;
        } else {
            index.insert(k, stored.len());
            stored.push(item);
        }
    }
}

/// Long-term storage of the catalog, one namespace (`node`) at a time.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn load(&self, node: &str) -> Result<CatalogSnapshot>;

    async fn save(&mut self, node: &str, changes: CatalogChanges) -> Result<()>;
}

/// In-process repository, also records what the last run wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    nodes: HashMap<String, CatalogSnapshot>,
    pub last_changes: Option<CatalogChanges>,
    pub saves: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(node: &str, snapshot: CatalogSnapshot) -> Self {
        let mut repository = Self::default();
        repository.nodes.insert(node.to_string(), snapshot);
        repository
    }

    pub fn snapshot(&self, node: &str) -> Option<&CatalogSnapshot> {
        self.nodes.get(node)
    }
}

#[async_trait]
impl CatalogRepository for MemoryRepository {
    async fn load(&self, node: &str) -> Result<CatalogSnapshot> {
        Ok(self.nodes.get(node).cloned().unwrap_or_default())
    }

    async fn save(&mut self, node: &str, changes: CatalogChanges) -> Result<()> {
        self.nodes
            .entry(node.to_string())
            .or_default()
            .apply(changes.clone());
        self.last_changes = Some(changes);
        self.saves += 1;
        Ok(())
    }
}
