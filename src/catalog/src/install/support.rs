use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::context::UpdateContext;
use crate::normalizer::round3;
use crate::types::{PriceDetail, SupportSpec, TypeSpec};

const SUPPORT_JSON: &str = include_str!("../../resources/support.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SupportPlan {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub spec: SupportSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SupportPlanPrice {
    pub code: String,
    #[serde(rename = "type")]
    pub type_code: String,
    pub cost: f64,
    pub min: f64,
    #[serde(default)]
    pub limit: Option<f64>,
    /// Percent of the monthly bill.
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Support plans of the vendor, shipped with the crate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SupportCatalog {
    pub types: Vec<SupportPlan>,
    pub prices: Vec<SupportPlanPrice>,
}

impl SupportCatalog {
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(SUPPORT_JSON).context("failed to parse the embedded support catalog")
    }
}

pub fn install_support(ctx: &mut UpdateContext, catalog: &SupportCatalog) {
    for plan in &catalog.types {
        ctx.install_type(&plan.code, TypeSpec::Support(SupportSpec::default()), |t| {
            t.name = plan.code.clone();
            t.description = plan.description.clone();
            t.spec = TypeSpec::Support(plan.spec.clone());
        });
    }

    for price in &catalog.prices {
        let detail = PriceDetail::Support {
            min: price.min,
            limit: price.limit,
            rate: price.rate,
        };
        ctx.install_price(
            &price.code,
            &price.type_code,
            detail.clone(),
            |p| p.detail = detail,
            round3(price.cost),
        );
    }
    info!(plans = catalog.types.len(), "support prices installed");
}
