use serde::{Deserialize, Serialize};
use std::fmt;

use super::Category;
use crate::registry::{Coded, Costed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VmOs {
    Linux,
    Windows,
}

impl VmOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            VmOs::Linux => "linux",
            VmOs::Windows => "windows",
        }
    }
}

impl fmt::Display for VmOs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenancy {
    #[default]
    Shared,
    Dedicated,
}

/// A cost attached to one resource type, normalized to the term period.
///
/// `code` is the upsert identity. Support prices have neither location nor
/// term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub code: String,
    pub type_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    pub period: u32,
    pub cost: f64,
    pub detail: PriceDetail,
}

impl Price {
    pub fn new(code: &str, type_code: &str, detail: PriceDetail) -> Self {
        Self {
            code: code.to_string(),
            type_code: type_code.to_string(),
            location: None,
            term: None,
            period: 0,
            cost: 0.0,
            detail,
        }
    }

    pub fn category(&self) -> Category {
        self.detail.category()
    }
}

impl Coded for Price {
    fn code(&self) -> &str {
        &self.code
    }
}

impl Costed for Price {
    fn cost(&self) -> f64 {
        self.cost
    }

    fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum PriceDetail {
    Instance {
        os: VmOs,
        tenancy: Tenancy,
    },
    Database {
        /// Upper-cased engine name.
        engine: String,
    },
    Storage,
    Support {
        min: f64,
        #[serde(default)]
        limit: Option<f64>,
        #[serde(default)]
        rate: Option<f64>,
    },
}

impl PriceDetail {
    pub fn category(&self) -> Category {
        match self {
            PriceDetail::Instance { .. } => Category::Instance,
            PriceDetail::Database { .. } => Category::Database,
            PriceDetail::Storage => Category::Storage,
            PriceDetail::Support { .. } => Category::Support,
        }
    }
}
