pub mod price;
pub mod region;
pub mod resource;
pub mod status;
pub mod term;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use price::{Price, PriceDetail, Tenancy, VmOs};
pub use region::{Region, RegionCatalog, RegionInfo};
pub use resource::{
    ComputeSpec, DatabaseSpec, Ratings, ResourceType, StorageOptimized, StorageSpec, SupportSpec,
    TypeSpec,
};
pub use status::{ImportStatus, Phase};
pub use term::PriceTerm;

/// Resource category shared by types and prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Instance,
    Database,
    Storage,
    Support,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Instance,
        Category::Database,
        Category::Storage,
        Category::Support,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Category::Instance => "instance",
            Category::Database => "database",
            Category::Storage => "storage",
            Category::Support => "support",
        };
        write!(f, "{name}")
    }
}

/// Ordinal quality scale used by types and storage latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rate {
    Worst,
    Low,
    #[default]
    Medium,
    Good,
    Best,
}
