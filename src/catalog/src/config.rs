use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HOURS_MONTH, DEFAULT_NODE, DEFAULT_PRICES_URL, MATCH_ALL};

/// Options of one catalog import run.
///
/// Built once by the caller and passed by value to the importer, nothing in
/// the pipeline reads process-wide configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImportConfig {
    pub node: String,
    pub prices_url: String,

    /// Admission patterns, matched case-insensitively against the whole value.
    pub regions: String,
    pub instance_type: String,
    pub database_type: String,
    pub database_engine: String,
    pub os: String,

    pub hours_month: f64,

    /// Persist every touched entity, even when unchanged.
    pub force: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            node: DEFAULT_NODE.to_string(),
            prices_url: DEFAULT_PRICES_URL.to_string(),
            regions: MATCH_ALL.to_string(),
            instance_type: MATCH_ALL.to_string(),
            database_type: MATCH_ALL.to_string(),
            database_engine: MATCH_ALL.to_string(),
            os: MATCH_ALL.to_string(),
            hours_month: DEFAULT_HOURS_MONTH,
            force: false,
        }
    }
}
