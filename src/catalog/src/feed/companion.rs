//! Companion feeds joined against the bulk price records.
//!
//! The vendor reshaped some of these between catalog revisions; each known
//! shape gets its own decoder converging on one type.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::raw::cost_of;

/// Compute flavor from the flavor feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorSpec {
    #[serde(default, alias = "flavorId")]
    pub id: Option<String>,
    #[serde(alias = "flavorName")]
    pub name: String,
    #[serde(default)]
    pub vcpus: Option<f64>,
    /// MiB
    #[serde(default)]
    pub ram: Option<f64>,
    /// GB
    #[serde(default)]
    pub disk: Option<f64>,
    #[serde(default)]
    pub inbound_bandwidth: Option<f64>,
    #[serde(default)]
    pub outbound_bandwidth: Option<f64>,
    #[serde(default)]
    pub os_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAvailability {
    pub engine: String,
    pub plan: String,
    pub flavor: String,
    /// Region group such as `GRA` or `DE`.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub min_node_number: Option<u32>,
    #[serde(default)]
    pub max_node_number: Option<u32>,
    #[serde(default)]
    pub min_disk_size: Option<u32>,
    #[serde(default)]
    pub max_disk_size: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl DatabaseAvailability {
    pub fn is_for(&self, engine: &str, plan: &str, flavor: &str) -> bool {
        self.engine.eq_ignore_ascii_case(engine)
            && self.plan.eq_ignore_ascii_case(plan)
            && self.flavor.eq_ignore_ascii_case(flavor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineCapability {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCapability {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub backup_retention: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlavorCapability {
    pub name: String,
    #[serde(default)]
    pub core: Option<u32>,
    /// GiB
    #[serde(default)]
    pub memory: Option<u32>,
    #[serde(default)]
    pub storage: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseCapabilities {
    #[serde(default)]
    pub engines: Vec<EngineCapability>,
    #[serde(default)]
    pub plans: Vec<PlanCapability>,
    #[serde(default)]
    pub flavors: Vec<FlavorCapability>,
}

impl DatabaseCapabilities {
    pub fn engine(&self, name: &str) -> Option<&EngineCapability> {
        self.engines.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn plan(&self, name: &str) -> Option<&PlanCapability> {
        self.plans.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AvailabilityFeed {
    Rows(Vec<DatabaseAvailability>),
    /// Older revision: availability tuples under `databaseCapabilities`,
    /// engine descriptors under `databaseAvaibility`.
    Wrapped {
        #[serde(default, rename = "databaseCapabilities")]
        rows: Vec<DatabaseAvailability>,
        #[serde(default, rename = "databaseAvaibility")]
        engines: Vec<EngineCapability>,
    },
}

/// Availability rows and, for the older revision, the engine descriptors
/// it carried along.
pub fn decode_availability(value: Value) -> Result<(Vec<DatabaseAvailability>, Vec<EngineCapability>)> {
    let feed: AvailabilityFeed =
        serde_json::from_value(value).context("unrecognized database availability feed")?;
    Ok(match feed {
        AvailabilityFeed::Rows(rows) => (rows, Vec::new()),
        AvailabilityFeed::Wrapped { rows, engines } => (rows, engines),
    })
}

/// Per-plan database price, used when the bulk feed has no regional price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabasePlanPrice {
    pub plan_code: String,
    pub hourly: Option<f64>,
    pub monthly: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanPriceRow {
    plan_code: String,
    #[serde(default)]
    all: Map<String, Value>,
}

/// Malformed rows are dropped with a warning, the feed itself must be an array.
pub fn decode_plan_prices(value: Value) -> Result<Vec<DatabasePlanPrice>> {
    let rows: Vec<PlanPriceRow> =
        serde_json::from_value(value).context("unrecognized database price feed")?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let cost = |key: &str| row.all.get(key).map(cost_of).transpose();
            match (cost("hourly"), cost("monthly")) {
                (Ok(hourly), Ok(monthly)) => Some(DatabasePlanPrice {
                    hourly: hourly.flatten(),
                    monthly: monthly.flatten(),
                    plan_code: row.plan_code,
                }),
                (Err(reason), _) | (_, Err(reason)) => {
                    warn!(plan_code = %row.plan_code, %reason, "skipping database plan price");
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flavor_accepts_both_revisions() {
        let current: FlavorSpec = serde_json::from_value(json!({
            "id": "abc", "name": "b2-7", "vcpus": 2, "ram": 7000, "disk": 50,
            "inboundBandwidth": 250, "outboundBandwidth": 250, "osType": "linux"
        }))
        .unwrap();
        let legacy: FlavorSpec = serde_json::from_value(json!({
            "flavorId": "abc", "flavorName": "b2-7", "region": "GRA7",
            "price": {"value": 0.07, "currencyCode": "EUR"}
        }))
        .unwrap();

        assert_eq!(current.name, legacy.name);
        assert_eq!(legacy.id.as_deref(), Some("abc"));
        assert_eq!(current.inbound_bandwidth, Some(250.0));
        assert_eq!(legacy.disk, None);
    }

    #[test]
    fn test_availability_rows() {
        let (rows, engines) = decode_availability(json!([
            {"engine": "mysql", "plan": "essential", "flavor": "db1-4", "region": "GRA",
             "minNodeNumber": 1, "maxNodeNumber": 1, "minDiskSize": 80, "maxDiskSize": 80}
        ]))
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_for("MySQL", "essential", "DB1-4"));
        assert!(engines.is_empty());
    }

    #[test]
    fn test_availability_wrapped_revision() {
        let (rows, engines) = decode_availability(json!({
            "databaseAvaibility": [{"name": "mysql", "description": "MySQL", "version": ["8"]}],
            "databaseCapabilities": [
                {"engine": "mysql", "plan": "business", "flavor": "db1-7", "region": "DE",
                 "default": false, "version": 8.0}
            ]
        }))
        .unwrap();
        assert_eq!(rows[0].region.as_deref(), Some("DE"));
        assert_eq!(engines[0].description.as_deref(), Some("MySQL"));
    }

    #[test]
    fn test_availability_rejects_unknown_shape() {
        assert!(decode_availability(json!("nope")).is_err());
    }

    #[test]
    fn test_plan_prices() {
        let prices = decode_plan_prices(json!([
            {"planCode": "databases.mysql-essential-db1-4.hour.consumption",
             "all": {"monthly": "€23.80", "hourly": "0.033"}},
            {"planCode": "databases.broken", "all": {"hourly": "soon"}},
            {"planCode": "databases.nothing"}
        ]))
        .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].monthly, Some(23.8));
        assert_eq!(prices[0].hourly, Some(0.033));
        assert_eq!(prices[1].hourly, None);
    }
}
