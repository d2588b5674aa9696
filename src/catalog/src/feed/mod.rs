pub mod companion;
pub mod raw;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

pub use companion::{
    DatabaseAvailability, DatabaseCapabilities, DatabasePlanPrice, EngineCapability, FlavorSpec,
};
pub use raw::{RawRecord, RegionalPrice};

/// Documents published under the catalog base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedResource {
    Prices,
    Flavors,
    DatabaseAvailability,
    DatabaseCapabilities,
    DatabasePrices,
}

impl FeedResource {
    /// Retrieval order.
    pub const ALL: [FeedResource; 5] = [
        FeedResource::Prices,
        FeedResource::Flavors,
        FeedResource::DatabaseAvailability,
        FeedResource::DatabaseCapabilities,
        FeedResource::DatabasePrices,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            FeedResource::Prices => "/price.json",
            FeedResource::Flavors => "/flavor.json",
            // vendor spelling
            FeedResource::DatabaseAvailability => "/databaseAvaibility.json",
            FeedResource::DatabaseCapabilities => "/databaseCapabilities.json",
            FeedResource::DatabasePrices => "/database-price.json",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FeedResource::Prices)
    }
}

impl fmt::Display for FeedResource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Retrieval of the raw feed documents.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// `Ok(None)` when the document does not exist.
    async fn fetch(&self, resource: FeedResource) -> Result<Option<Value>>;
}

/// Every feed of one run, decoded and indexed for the installers.
#[derive(Debug, Clone, Default)]
pub struct CatalogFeeds {
    pub prices: Vec<Value>,
    /// Keyed by lower-cased flavor name.
    pub flavors: HashMap<String, FlavorSpec>,
    pub availability: Vec<DatabaseAvailability>,
    pub capabilities: DatabaseCapabilities,
    /// Keyed by plan code.
    pub plan_prices: HashMap<String, DatabasePlanPrice>,
}

impl CatalogFeeds {
    /// Fetch every feed in order. Any failure aborts, a missing optional
    /// feed is empty.
    pub async fn retrieve<F: FeedSource + ?Sized>(source: &F) -> Result<Self> {
        let mut feeds = CatalogFeeds::default();

        for resource in FeedResource::ALL {
            let Some(value) = source
                .fetch(resource)
                .await
                .with_context(|| format!("failed to retrieve {resource}"))?
            else {
                if resource.is_required() {
                    bail!("required feed {resource} not found");
                }
                debug!(%resource, "optional feed not found");
                continue;
            };
            feeds
                .absorb(resource, value)
                .with_context(|| format!("failed to decode {resource}"))?;
        }

        info!(
            prices = feeds.prices.len(),
            flavors = feeds.flavors.len(),
            availability = feeds.availability.len(),
            plan_prices = feeds.plan_prices.len(),
            "catalog retrieved"
        );
        Ok(feeds)
    }

    fn absorb(&mut self, resource: FeedResource, value: Value) -> Result<()> {
        match resource {
            FeedResource::Prices => {
                let Value::Array(records) = value else {
                    bail!("expected an array of price records");
                };
                self.prices = records;
            }
            FeedResource::Flavors => {
                let flavors: Vec<FlavorSpec> = serde_json::from_value(value)?;
                self.flavors = flavors
                    .into_iter()
                    .map(|f| (f.name.to_lowercase(), f))
                    .collect();
            }
            FeedResource::DatabaseAvailability => {
                let (rows, engines) = companion::decode_availability(value)?;
                self.availability = rows;
                for engine in engines {
                    if self.capabilities.engine(&engine.name).is_none() {
                        self.capabilities.engines.push(engine);
                    }
                }
            }
            FeedResource::DatabaseCapabilities => {
                let capabilities: DatabaseCapabilities = serde_json::from_value(value)?;
                // descriptors from the availability feed only fill gaps
                let legacy = std::mem::replace(&mut self.capabilities, capabilities);
                for engine in legacy.engines {
                    if self.capabilities.engine(&engine.name).is_none() {
                        self.capabilities.engines.push(engine);
                    }
                }
            }
            FeedResource::DatabasePrices => {
                self.plan_prices = companion::decode_plan_prices(value)?
                    .into_iter()
                    .map(|p| (p.plan_code.clone(), p))
                    .collect();
            }
        }
        Ok(())
    }

    pub fn flavor(&self, name: &str) -> Option<&FlavorSpec> {
        self.flavors.get(&name.to_lowercase())
    }

    pub fn availability_of<'a>(
        &'a self,
        engine: &'a str,
        plan: &'a str,
        flavor: &'a str,
    ) -> impl Iterator<Item = &'a DatabaseAvailability> + 'a {
        self.availability
            .iter()
            .filter(move |a| a.is_for(engine, plan, flavor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticFeed(HashMap<FeedResource, Value>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self, resource: FeedResource) -> Result<Option<Value>> {
            Ok(self.0.get(&resource).cloned())
        }
    }

    #[tokio::test]
    async fn test_missing_optional_feeds_are_empty() {
        let source = StaticFeed(HashMap::from([(
            FeedResource::Prices,
            json!([{"planCode": "volume.classic.consumption"}]),
        )]));
        let feeds = CatalogFeeds::retrieve(&source).await.unwrap();
        assert_eq!(feeds.prices.len(), 1);
        assert!(feeds.flavors.is_empty());
        assert!(feeds.plan_prices.is_empty());
    }

    #[tokio::test]
    async fn test_missing_price_feed_is_fatal() {
        let source = StaticFeed(HashMap::new());
        let err = CatalogFeeds::retrieve(&source).await.unwrap_err();
        assert!(err.to_string().contains("/price.json"));
    }

    #[tokio::test]
    async fn test_malformed_feed_is_fatal() {
        let source = StaticFeed(HashMap::from([
            (FeedResource::Prices, json!([])),
            (FeedResource::Flavors, json!({"name": "b2-7"})),
        ]));
        let err = CatalogFeeds::retrieve(&source).await.unwrap_err();
        assert!(err.to_string().contains("/flavor.json"));
    }

    #[tokio::test]
    async fn test_feeds_are_indexed() {
        let source = StaticFeed(HashMap::from([
            (FeedResource::Prices, json!([])),
            (FeedResource::Flavors, json!([{"name": "B2-7", "vcpus": 2}])),
            (
                FeedResource::DatabaseAvailability,
                json!({"databaseAvaibility": [{"name": "mysql", "description": "legacy"}]}),
            ),
            (
                FeedResource::DatabaseCapabilities,
                json!({"engines": [{"name": "postgresql", "description": "PostgreSQL"}]}),
            ),
        ]));
        let feeds = CatalogFeeds::retrieve(&source).await.unwrap();
        assert!(feeds.flavor("b2-7").is_some());
        assert_eq!(feeds.capabilities.engines.len(), 2);
        assert_eq!(
            feeds.capabilities.engine("MYSQL").and_then(|e| e.description.as_deref()),
            Some("legacy")
        );
    }
}
