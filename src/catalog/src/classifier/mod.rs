//! Sorting of the bulk price records into resource categories.
//!
//! The plan code is tested against an ordered list of markers; the first hit
//! wins. Database markers are tested before instance ones because flavor
//! families overlap.

pub mod decoders;

use serde_json::Value;
use tracing::{debug, warn};

use crate::feed::{RawRecord, RegionalPrice};
use crate::skip::SkipReason;

pub use decoders::{
    DatabaseShape, InstanceLayout, InstanceShape, StorageKind, StorageShape,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCategory {
    Storage,
    Archive,
    Volume,
    Database,
    Instance,
    Snapshot,
    Bandwidth,
}

pub fn classify(plan_code: &str) -> Option<FeedCategory> {
    let has = |marker: &str| plan_code.contains(marker);

    if has("storage") && !has("bandwidth") {
        Some(FeedCategory::Storage)
    } else if has("archive") {
        Some(FeedCategory::Archive)
    } else if has("volume.") {
        Some(FeedCategory::Volume)
    } else if has("databases") || has("db1-") || has("db2-") {
        Some(FeedCategory::Database)
    } else if (has("instance") && !has("bandwidth"))
        || ["b2-", "c2-", "t1-", "t2-", "d2-"].iter().any(|m| has(m))
        || (has("i1-") && !has(".ai1-1"))
    {
        Some(FeedCategory::Instance)
    } else if has("snapshot.") {
        Some(FeedCategory::Snapshot)
    } else if has("bandwidth") {
        Some(FeedCategory::Bandwidth)
    } else {
        None
    }
}

/// A compute flavor sold in one region.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOffer {
    pub plan_code: String,
    pub region: String,
    pub shape: InstanceShape,
    pub prices: RegionalPrice,
}

/// A database plan, for one region group or for every region when the
/// record carries no region key.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseOffer {
    pub plan_code: String,
    pub region_group: Option<String>,
    pub shape: DatabaseShape,
    pub prices: RegionalPrice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageOffer {
    pub plan_code: String,
    pub region: String,
    pub shape: StorageShape,
    pub prices: RegionalPrice,
}

impl StorageOffer {
    pub fn cost(&self) -> Option<f64> {
        self.shape.cost(&self.prices)
    }
}

/// Every offer of the bulk feed, by category.
#[derive(Debug, Clone, Default)]
pub struct CatalogOffers {
    pub instances: Vec<InstanceOffer>,
    pub databases: Vec<DatabaseOffer>,
    pub storages: Vec<StorageOffer>,
    pub bandwidth: usize,
    pub skipped: usize,
}

impl CatalogOffers {
    pub fn from_records(records: &[Value]) -> Self {
        let mut offers = CatalogOffers::default();
        for value in records {
            let plan_code = value.get("planCode").and_then(Value::as_str).unwrap_or_default();
            if let Err(reason) = offers.add(value) {
                warn!(plan_code, %reason, "skipping price record");
                offers.skipped += 1;
            }
        }
        debug!(
            instances = offers.instances.len(),
            databases = offers.databases.len(),
            storages = offers.storages.len(),
            bandwidth = offers.bandwidth,
            skipped = offers.skipped,
            "price records classified"
        );
        offers
    }

    fn add(&mut self, value: &Value) -> Result<(), SkipReason> {
        let record = RawRecord::from_value(value)?;
        let category = classify(&record.plan_code).ok_or(SkipReason::Unclassifiable)?;

        match category {
            FeedCategory::Instance => {
                let shape = decoders::decode_instance(&record)?;
                if record.regions.is_empty() {
                    return Err(SkipReason::NoPrice);
                }
                self.instances
                    .extend(record.regions.into_iter().map(|(region, prices)| InstanceOffer {
                        plan_code: record.plan_code.clone(),
                        region,
                        shape: shape.clone(),
                        prices,
                    }));
            }
            FeedCategory::Database => {
                let shape = decoders::decode_database(&record)?;
                if record.regions.is_empty() {
                    self.databases.push(DatabaseOffer {
                        plan_code: record.plan_code,
                        region_group: None,
                        shape,
                        prices: RegionalPrice::default(),
                    });
                    return Ok(());
                }
                self.databases
                    .extend(record.regions.into_iter().map(|(group, prices)| DatabaseOffer {
                        plan_code: record.plan_code.clone(),
                        region_group: Some(group),
                        shape: shape.clone(),
                        prices,
                    }));
            }
            FeedCategory::Bandwidth => self.bandwidth += 1,
            storage => {
                let shape = decoders::decode_storage(storage, &record)?;
                if record.regions.is_empty() {
                    return Err(SkipReason::NoPrice);
                }
                self.storages
                    .extend(record.regions.into_iter().map(|(region, prices)| StorageOffer {
                        plan_code: record.plan_code.clone(),
                        region,
                        shape: shape.clone(),
                        prices,
                    }));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::object_storage("storage.consumption", Some(FeedCategory::Storage))]
    #[case::storage_bandwidth("bandwidth_storage.out", Some(FeedCategory::Bandwidth))]
    #[case::archive("archive.consumption", Some(FeedCategory::Archive))]
    #[case::volume("volume.classic.consumption", Some(FeedCategory::Volume))]
    #[case::database("databases.mysql-essential-db1-15.hour.consumption", Some(FeedCategory::Database))]
    #[case::db_flavor("db1-4.hour", Some(FeedCategory::Database))]
    #[case::instance("b2-7.consumption", Some(FeedCategory::Instance))]
    #[case::instance_word("instance.win.consumption", Some(FeedCategory::Instance))]
    #[case::iops("i1-45.consumption", Some(FeedCategory::Instance))]
    #[case::ai_training("ai1-1.consumption", Some(FeedCategory::Instance))]
    #[case::ai_notebook("notebook.ai1-1-gpu", None)]
    #[case::snapshot("snapshot.consumption", Some(FeedCategory::Snapshot))]
    #[case::instance_bandwidth("instance.bandwidth.consumption", Some(FeedCategory::Bandwidth))]
    #[case::unknown("floatingip.consumption", None)]
    fn test_classify(#[case] plan_code: &str, #[case] expected: Option<FeedCategory>) {
        assert_eq!(classify(plan_code), expected);
    }

    #[test]
    fn test_offers_are_split_by_region() {
        let offers = CatalogOffers::from_records(&[
            json!({
                "planCode": "b2-7.consumption",
                "attr-0": "b2-7", "attr-1": "7 GB", "attr-2": "2",
                "GRA7": {"hourly": "0.0681"}, "WAW1": {"hourly": "0.0681"}
            }),
            json!({
                "planCode": "databases.mysql-essential-db1-15.hour.consumption",
                "attr-1": "15 GB", "attr-2": "4", "attr-7": "0.35",
                "all": {"hourly": "0.35"}
            }),
            json!({"planCode": "volume.classic.consumption", "GRA": {"value": 0.04}}),
            json!({"planCode": "instance.bandwidth.consumption", "GRA": 0.01}),
            json!({"planCode": "floatingip.consumption", "GRA": 0.01}),
            json!({"planCode": "b2-15.consumption", "attr-0": "b2-15"}),
        ]);

        assert_eq!(offers.instances.len(), 2);
        assert_eq!(offers.instances[0].region, "gra7");
        assert_eq!(offers.databases.len(), 1);
        assert_eq!(offers.databases[0].region_group.as_deref(), Some("all"));
        assert_eq!(offers.storages.len(), 1);
        assert_eq!(offers.storages[0].cost(), Some(0.04));
        assert_eq!(offers.bandwidth, 1);
        assert_eq!(offers.skipped, 2);
    }
}
