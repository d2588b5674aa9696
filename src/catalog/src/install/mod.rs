//! Materialization of the admitted offers into the update context.
//!
//! Each installer filters first, then creates or merges the type, then one
//! price per region, term and variant. Record-level problems are counted as
//! skips and never abort the run.

pub mod database;
pub mod instance;
pub mod storage;
pub mod support;

use crate::constants::{HOURLY_TERM, HOURLY_TERM_PERIOD, MONTHLY_TERM, MONTHLY_TERM_PERIOD};
use crate::context::UpdateContext;
use crate::normalizer::{hourly_cost, period_cost};
use crate::types::PriceTerm;

pub use database::install_databases;
pub use instance::install_instances;
pub use storage::install_storages;
pub use support::{install_support, SupportCatalog};

/// The two billing terms of the vendor.
#[derive(Debug, Clone)]
pub struct Terms {
    pub hourly: PriceTerm,
    pub monthly: PriceTerm,
}

impl Terms {
    pub fn install(ctx: &mut UpdateContext) -> Self {
        Self {
            hourly: ctx.install_term(HOURLY_TERM, HOURLY_TERM_PERIOD),
            monthly: ctx.install_term(MONTHLY_TERM, MONTHLY_TERM_PERIOD),
        }
    }

    /// Normalized cost per term, for the raw values that exist.
    ///
    /// An hourly value becomes the monthly equivalent under the consumption
    /// term, a monthly value is scaled to the monthly term period.
    pub fn costs(
        &self,
        hourly: Option<f64>,
        monthly: Option<f64>,
        hours_month: f64,
    ) -> Vec<(&PriceTerm, f64)> {
        let mut costs = Vec::with_capacity(2);
        if let Some(hourly) = hourly {
            costs.push((&self.hourly, hourly_cost(hourly, hours_month)));
        }
        if let Some(monthly) = monthly {
            costs.push((&self.monthly, period_cost(monthly, self.monthly.period)));
        }
        costs
    }
}
