//! One decoder per feed category, from the positional attribute list to a
//! typed offer. Decoders are pure: no filtering, no lookups.

use crate::constants::{
    ARCHIVE_TYPE, CONSUMPTION_SUFFIX, DATABASE_PREFIX, DATABASE_SUFFIX, OBJECT_STORAGE_TYPE,
    SNAPSHOT_SUFFIX, SNAPSHOT_TYPE,
};
use crate::feed::{RawRecord, RegionalPrice};
use crate::normalizer::{gib_to_mib, parse_cost, parse_quantity};
use crate::skip::SkipReason;

use super::FeedCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceLayout {
    Gpu,
    Nvme,
    Standard,
}

/// Shape of a compute flavor, as advertised by a price record.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceShape {
    pub name: String,
    pub layout: InstanceLayout,
    pub cpu: f64,
    /// MiB
    pub ram: u32,
    pub gpu: Option<String>,
    pub disk: Option<String>,
    pub nvme_disks: Option<String>,
    pub public_network: Option<String>,
    pub private_network: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseShape {
    pub engine: String,
    pub plan: String,
    pub flavor: String,
    pub cpu: f64,
    pub ram: u32,
    pub storage: Option<String>,
    pub public_network: Option<String>,
    pub private_network: Option<String>,
    pub dedicated_node: Option<String>,
}

impl DatabaseShape {
    /// `<plan>/<flavor>`
    pub fn type_code(&self) -> String {
        format!("{}/{}", self.plan, self.flavor)
    }

    /// `<engine>-<plan>-<flavor>`
    pub fn plan_code(&self) -> String {
        format!("{}-{}-{}", self.engine, self.plan, self.flavor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Object,
    Archive,
    Volume,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageShape {
    pub kind: StorageKind,
    /// Storage type code.
    pub code: String,
    /// Price from the attributes, when the record carries one.
    pub listed: Option<f64>,
    /// The attribute said `Included`.
    pub included: bool,
}

impl StorageShape {
    /// Listed price first, then the flat regional price.
    pub fn cost(&self, regional: &RegionalPrice) -> Option<f64> {
        if self.included {
            return None;
        }
        self.listed.or_else(|| regional.flat())
    }
}

fn optional(record: &RawRecord, index: usize) -> Option<String> {
    record.attribute(index).map(str::to_string)
}

fn cpu_ram(record: &RawRecord) -> Result<(f64, u32), SkipReason> {
    let ram = parse_quantity(record.require(1)?)?;
    let cpu = parse_quantity(record.require(2)?)?;
    Ok((cpu, gib_to_mib(ram)))
}

pub fn decode_instance(record: &RawRecord) -> Result<InstanceShape, SkipReason> {
    let code = record.plan_code.as_str();
    let name = record.require(0)?.to_string();

    let layout = if code.contains("t2-") || (code.contains("t1-") && record.has_attribute(8)) {
        InstanceLayout::Gpu
    } else if code.contains("t1-") || (code.contains("i1-") && record.has_attribute(7)) {
        InstanceLayout::Nvme
    } else {
        InstanceLayout::Standard
    };
    let (cpu, ram) = cpu_ram(record)?;

    let (gpu, disk, nvme_disks, public, private) = match layout {
        InstanceLayout::Gpu => (optional(record, 3), optional(record, 4), None, 5, 6),
        InstanceLayout::Nvme => (None, optional(record, 3), optional(record, 4), 5, 6),
        InstanceLayout::Standard => (None, optional(record, 3), None, 4, 5),
    };

    Ok(InstanceShape {
        name,
        layout,
        cpu,
        ram,
        gpu,
        disk,
        nvme_disks,
        public_network: optional(record, public),
        private_network: optional(record, private),
    })
}

/// `databases.<engine>-<plan>-<f1>-<f2>.hour.consumption` to its triple.
pub fn split_database_plan(plan_code: &str) -> Result<(String, String, String), SkipReason> {
    let details = plan_code
        .strip_prefix(DATABASE_PREFIX)
        .unwrap_or(plan_code)
        .trim_end_matches(DATABASE_SUFFIX);
    let tokens: Vec<&str> = details.split('-').collect();
    match tokens.as_slice() {
        [engine, plan, f1, f2, ..] if !engine.is_empty() && !plan.is_empty() => Ok((
            engine.to_lowercase(),
            plan.to_lowercase(),
            format!("{}-{}", f1, f2).to_lowercase(),
        )),
        _ => Err(SkipReason::MalformedPlanCode),
    }
}

pub fn decode_database(record: &RawRecord) -> Result<DatabaseShape, SkipReason> {
    let (engine, plan, flavor) = split_database_plan(&record.plan_code)?;
    let (cpu, ram) = cpu_ram(record)?;

    let (storage, public) = if record.has_attribute(7) {
        (optional(record, 3), 4)
    } else {
        (None, 3)
    };

    Ok(DatabaseShape {
        engine,
        plan,
        flavor,
        cpu,
        ram,
        storage,
        public_network: optional(record, public),
        private_network: optional(record, public + 1),
        dedicated_node: optional(record, public + 2),
    })
}

pub fn decode_storage(
    category: FeedCategory,
    record: &RawRecord,
) -> Result<StorageShape, SkipReason> {
    let (kind, code, attribute) = match category {
        FeedCategory::Storage => (StorageKind::Object, OBJECT_STORAGE_TYPE.to_string(), record.attribute(1)),
        FeedCategory::Archive => (StorageKind::Archive, ARCHIVE_TYPE.to_string(), record.attribute(1)),
        FeedCategory::Snapshot => (StorageKind::Snapshot, SNAPSHOT_TYPE.to_string(), record.attribute(1)),
        FeedCategory::Volume => {
            // a volume snapshot is billed under its volume's type
            let code = record
                .plan_code
                .replace(CONSUMPTION_SUFFIX, "")
                .replace(SNAPSHOT_SUFFIX, "");
            // newer revisions add leading columns
            let attribute = record
                .attribute(3)
                .or_else(|| record.attribute(2))
                .or_else(|| record.attribute(1));
            (StorageKind::Volume, code, attribute)
        }
        _ => return Err(SkipReason::Unclassifiable),
    };

    let (listed, included) = match attribute.map(parse_cost).transpose()? {
        Some(Some(cost)) => (Some(cost), false),
        Some(None) => (None, true),
        None => (None, false),
    };

    Ok(StorageShape {
        kind,
        code,
        listed,
        included,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        RawRecord::from_value(&value).unwrap()
    }

    #[test]
    fn test_standard_instance() {
        let shape = decode_instance(&record(json!({
            "planCode": "b2-7.consumption",
            "attr-0": "b2-7", "attr-1": "7\u{a0}GB", "attr-2": "2 vCores",
            "attr-3": "50 GB SSD", "attr-4": "250 Mbit/s", "attr-5": "4 Gbit/s", "attr-6": "0.0681"
        })))
        .unwrap();

        assert_eq!(shape.layout, InstanceLayout::Standard);
        assert_eq!(shape.name, "b2-7");
        assert_eq!(shape.cpu, 2.0);
        assert_eq!(shape.ram, 7168);
        assert_eq!(shape.disk.as_deref(), Some("50 GB SSD"));
        assert_eq!(shape.public_network.as_deref(), Some("250 Mbit/s"));
        assert_eq!(shape.private_network.as_deref(), Some("4 Gbit/s"));
    }

    #[test]
    fn test_gpu_instance() {
        let shape = decode_instance(&record(json!({
            "planCode": "t2-45.consumption",
            "attr-0": "t2-45", "attr-1": "45 GB", "attr-2": "15",
            "attr-3": "1 x Tesla V100S", "attr-4": "400 GB NVMe", "attr-5": "2 Gbit/s",
            "attr-6": "4 Gbit/s", "attr-7": "2.19"
        })))
        .unwrap();
        assert_eq!(shape.layout, InstanceLayout::Gpu);
        assert_eq!(shape.gpu.as_deref(), Some("1 x Tesla V100S"));
        assert_eq!(shape.disk.as_deref(), Some("400 GB NVMe"));
        assert_eq!(shape.public_network.as_deref(), Some("2 Gbit/s"));
    }

    #[test]
    fn test_nvme_instance() {
        let shape = decode_instance(&record(json!({
            "planCode": "i1-45.consumption",
            "attr-0": "i1-45", "attr-1": "45 GB", "attr-2": "8",
            "attr-3": "50 GB", "attr-4": "2 x 1.9 TB NVMe", "attr-5": "1 Gbit/s",
            "attr-6": "4 Gbit/s", "attr-7": "0.72"
        })))
        .unwrap();
        assert_eq!(shape.layout, InstanceLayout::Nvme);
        assert_eq!(shape.nvme_disks.as_deref(), Some("2 x 1.9 TB NVMe"));
        assert_eq!(shape.gpu, None);
    }

    #[test]
    fn test_instance_without_cpu_is_skipped() {
        let err = decode_instance(&record(json!({
            "planCode": "b2-7.consumption", "attr-0": "b2-7", "attr-1": "7 GB"
        })))
        .unwrap_err();
        assert_eq!(err, SkipReason::MissingAttribute(2));
    }

    #[test]
    fn test_database_with_storage_column() {
        let shape = decode_database(&record(json!({
            "planCode": "databases.mysql-essential-db1-15.hour.consumption",
            "attr-0": "db1-15", "attr-1": "15 GB", "attr-2": "4",
            "attr-3": "240 GB", "attr-4": "yes", "attr-5": "no", "attr-6": "1", "attr-7": "0.35"
        })))
        .unwrap();

        assert_eq!(shape.engine, "mysql");
        assert_eq!(shape.plan, "essential");
        assert_eq!(shape.flavor, "db1-15");
        assert_eq!(shape.storage.as_deref(), Some("240 GB"));
        assert_eq!(shape.dedicated_node.as_deref(), Some("1"));
        assert_eq!(shape.type_code(), "essential/db1-15");
        assert_eq!(shape.plan_code(), "mysql-essential-db1-15");
        assert_eq!(shape.ram, 15 * 1024);
    }

    #[test]
    fn test_database_without_storage_column() {
        let shape = decode_database(&record(json!({
            "planCode": "databases.postgresql-business-db1-7.hour.consumption",
            "attr-1": "7 GB", "attr-2": "2", "attr-3": "public", "attr-4": "private",
            "attr-5": "3", "attr-6": "0.2"
        })))
        .unwrap();
        assert_eq!(shape.storage, None);
        assert_eq!(shape.public_network.as_deref(), Some("public"));
        assert_eq!(shape.dedicated_node.as_deref(), Some("3"));
    }

    #[rstest]
    #[case::short("databases.mysql-essential.hour.consumption")]
    #[case::empty("databases.")]
    fn test_malformed_database_plan(#[case] plan_code: &str) {
        assert_eq!(
            split_database_plan(plan_code),
            Err(SkipReason::MalformedPlanCode)
        );
    }

    #[rstest]
    #[case::fourth("volume.high-speed.consumption", json!({"attr-1": "1", "attr-2": "2", "attr-3": "0.08"}), Some(0.08))]
    #[case::third("volume.high-speed.consumption", json!({"attr-1": "1", "attr-2": "0.07"}), Some(0.07))]
    #[case::second("volume.high-speed.consumption", json!({"attr-1": "0.06"}), Some(0.06))]
    #[case::none("volume.high-speed.consumption", json!({}), None)]
    fn test_volume_price_precedence(
        #[case] plan_code: &str,
        #[case] attributes: serde_json::Value,
        #[case] listed: Option<f64>,
    ) {
        let mut value = attributes;
        value["planCode"] = json!(plan_code);
        let shape = decode_storage(FeedCategory::Volume, &record(value)).unwrap();
        assert_eq!(shape.code, "volume.high-speed");
        assert_eq!(shape.listed, listed);
    }

    #[rstest]
    #[case::volume("volume.classic.consumption")]
    #[case::volume_snapshot("volume.classic.snapshot.consumption")]
    fn test_volume_snapshot_shares_volume_code(#[case] plan_code: &str) {
        let shape = decode_storage(
            FeedCategory::Volume,
            &record(json!({"planCode": plan_code, "attr-1": "0.04"})),
        )
        .unwrap();
        assert_eq!(shape.code, "volume.classic");
        assert_eq!(shape.kind, StorageKind::Volume);
    }

    #[test]
    fn test_storage_included_has_no_cost() {
        let shape = decode_storage(
            FeedCategory::Storage,
            &record(json!({"planCode": "storage.consumption", "attr-1": "Included"})),
        )
        .unwrap();
        assert!(shape.included);
        let regional = RegionalPrice {
            generic: Some(0.01),
            ..Default::default()
        };
        assert_eq!(shape.cost(&regional), None);
    }

    #[test]
    fn test_snapshot_falls_back_to_regional_value() {
        let shape = decode_storage(
            FeedCategory::Snapshot,
            &record(json!({"planCode": "snapshot.consumption"})),
        )
        .unwrap();
        assert_eq!(shape.code, "snapshot");
        let regional = RegionalPrice {
            generic: Some(0.01),
            ..Default::default()
        };
        assert_eq!(shape.cost(&regional), Some(0.01));
    }
}
