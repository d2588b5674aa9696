use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::registry::Coded;

const REGIONS_JSON: &str = include_str!("../../resources/regions.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Lower-cased vendor region code, e.g. `gra7`.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Region {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            sub_region: None,
            country: None,
        }
    }
}

impl Coded for Region {
    fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub name: String,
    #[serde(default)]
    pub sub_region: Option<String>,
    #[serde(default)]
    pub country_a2: Option<String>,
}

/// Descriptive data of the vendor datacenters, keyed by code or by region group.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: HashMap<String, RegionInfo>,
}

impl RegionCatalog {
    pub fn embedded() -> Result<Self> {
        Self::from_json(REGIONS_JSON).context("failed to parse the embedded region catalog")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let regions: HashMap<String, RegionInfo> = serde_json::from_str(json)?;
        Ok(Self {
            regions: regions
                .into_iter()
                .map(|(code, info)| (code.to_lowercase(), info))
                .collect(),
        })
    }

    /// Exact code first, then its group: `gra11` falls back to `gra`.
    pub fn describe(&self, code: &str) -> Option<&RegionInfo> {
        let code = code.to_lowercase();
        self.regions.get(&code).or_else(|| {
            let group: String = code.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
            self.regions.get(&group)
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
