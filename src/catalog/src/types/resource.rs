use serde::{Deserialize, Serialize};

use super::{Category, Rate};
use crate::registry::Coded;

/// A named shape offered by the vendor: a compute flavor, a managed database
/// plan, a storage class or a support plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub spec: TypeSpec,
}

impl ResourceType {
    pub fn new(code: &str, spec: TypeSpec) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            spec,
        }
    }

    pub fn category(&self) -> Category {
        self.spec.category()
    }
}

impl Coded for ResourceType {
    fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum TypeSpec {
    Instance(ComputeSpec),
    Database(DatabaseSpec),
    Storage(StorageSpec),
    Support(SupportSpec),
}

impl TypeSpec {
    pub fn category(&self) -> Category {
        match self {
            TypeSpec::Instance(_) => Category::Instance,
            TypeSpec::Database(_) => Category::Database,
            TypeSpec::Storage(_) => Category::Storage,
            TypeSpec::Support(_) => Category::Support,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub cpu: Rate,
    pub ram: Rate,
    pub network: Rate,
    pub storage: Rate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputeSpec {
    pub cpu: f64,
    /// MiB
    pub ram: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvme_disks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_network: Option<String>,
    /// Mbit/s, from the flavor feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_bandwidth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_bandwidth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_family: Option<String>,
    pub auto_scale: bool,
    pub ratings: Ratings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub cpu: f64,
    pub ram: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
    /// GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_disk: Option<u32>,
    /// ISO-8601 duration such as `P30D`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_retention: Option<String>,
    pub auto_scale: bool,
    pub ratings: Ratings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageOptimized {
    #[default]
    Iops,
    Throughput,
    Durability,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageSpec {
    pub iops: u32,
    /// MB/s
    pub throughput: u32,
    pub latency: Rate,
    pub durability9: u32,
    pub optimized: StorageOptimized,
    /// GiB
    pub minimal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<f64>,
    /// Percent
    pub availability: f64,
    /// Instance type pattern the storage can be attached to, `%` for any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportSpec {
    #[serde(default)]
    pub access_api: Option<String>,
    #[serde(default)]
    pub access_chat: Option<String>,
    #[serde(default)]
    pub access_email: Option<String>,
    #[serde(default)]
    pub access_phone: Option<String>,
    /// Hours of the day, UTC.
    #[serde(default)]
    pub sla_start_time: Option<u32>,
    #[serde(default)]
    pub sla_end_time: Option<u32>,
    #[serde(default)]
    pub sla_week_end: bool,
    /// Response times in minutes.
    #[serde(default)]
    pub sla_general_guidance: Option<u32>,
    #[serde(default)]
    pub sla_system_impaired: Option<u32>,
    #[serde(default)]
    pub sla_production_system_impaired: Option<u32>,
    #[serde(default)]
    pub sla_production_system_down: Option<u32>,
    #[serde(default)]
    pub sla_business_critical_system_down: Option<u32>,
    #[serde(default)]
    pub commitment: Option<u32>,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub level: Option<Rate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_spec_is_tagged_by_category() {
        let mut t = ResourceType::new("volume.classic", TypeSpec::Storage(StorageSpec::default()));
        t.name = "Classic".into();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["spec"]["category"], "storage");

        let back: ResourceType = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.category(), Category::Storage);
    }
}
