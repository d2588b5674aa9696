//! Operator admission rules.
//!
//! Every option is a case-insensitive regular expression that must match the
//! whole candidate. A record rejected here is never materialized.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::config::ImportConfig;
use crate::constants::EXCLUDED_ENGINE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Region,
    InstanceType,
    DatabaseType,
    DatabaseEngine,
    Os,
}

impl FilterKind {
    fn option(&self) -> &'static str {
        match self {
            FilterKind::Region => "regions",
            FilterKind::InstanceType => "instance_type",
            FilterKind::DatabaseType => "database_type",
            FilterKind::DatabaseEngine => "database_engine",
            FilterKind::Os => "os",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogFilters {
    region: Regex,
    instance_type: Regex,
    database_type: Regex,
    database_engine: Regex,
    os: Regex,
}

impl CatalogFilters {
    pub fn compile(config: &ImportConfig) -> Result<Self> {
        Ok(Self {
            region: full_match(FilterKind::Region, &config.regions)?,
            instance_type: full_match(FilterKind::InstanceType, &config.instance_type)?,
            database_type: full_match(FilterKind::DatabaseType, &config.database_type)?,
            database_engine: full_match(FilterKind::DatabaseEngine, &config.database_engine)?,
            os: full_match(FilterKind::Os, &config.os)?,
        })
    }

    pub fn is_admitted(&self, kind: FilterKind, candidate: &str) -> bool {
        match kind {
            FilterKind::Region => self.region.is_match(candidate),
            FilterKind::InstanceType => self.instance_type.is_match(candidate),
            FilterKind::DatabaseType => self.database_type.is_match(candidate),
            FilterKind::DatabaseEngine => {
                // not a relational engine, whatever the pattern says
                !candidate.eq_ignore_ascii_case(EXCLUDED_ENGINE)
                    && self.database_engine.is_match(candidate)
            }
            FilterKind::Os => self.os.is_match(candidate),
        }
    }
}

fn full_match(kind: FilterKind, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid {} pattern: {pattern}", kind.option()))
}
