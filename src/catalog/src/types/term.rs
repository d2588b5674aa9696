use serde::{Deserialize, Serialize};

use crate::registry::Coded;

/// Billing granularity. Commitment and convertibility flags are always off
/// for this vendor but kept so the catalog shape matches other providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTerm {
    pub code: String,
    pub name: String,
    /// Length in months, 0 for pay-as-you-go.
    pub period: u32,
    pub reservation: bool,
    pub convertible_family: bool,
    pub convertible_type: bool,
    pub convertible_location: bool,
    pub convertible_os: bool,
    pub ephemeral: bool,
}

impl PriceTerm {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            period: 0,
            reservation: false,
            convertible_family: false,
            convertible_type: false,
            convertible_location: false,
            convertible_os: false,
            ephemeral: false,
        }
    }

    pub fn is_hourly(&self) -> bool {
        self.period == 0
    }
}

impl Coded for PriceTerm {
    fn code(&self) -> &str {
        &self.code
    }
}
