use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use ovhcat_catalog::constants::{DEFAULT_HOURS_MONTH, DEFAULT_NODE, DEFAULT_PRICES_URL, MATCH_ALL};
use ovhcat_catalog::ImportConfig;
use serde::{Deserialize, Serialize};

use crate::commands::InstallArgs;

pub const ENV_PREFIX: &str = "OVHCAT";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub node: String,
    pub prices_url: String,
    pub regions: String,
    pub instance_type: String,
    pub database_type: String,
    pub database_engine: String,
    pub os: String,
    pub hours_month: f64,
    pub force: bool,

    pub store: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Command line flags win over every other source.
    pub fn apply(&mut self, args: &InstallArgs) {
        let overrides = [
            (&mut self.node, &args.node),
            (&mut self.prices_url, &args.prices_url),
            (&mut self.regions, &args.regions),
            (&mut self.instance_type, &args.instance_type),
            (&mut self.database_type, &args.database_type),
            (&mut self.database_engine, &args.database_engine),
            (&mut self.os, &args.os),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        if let Some(hours_month) = args.hours_month {
            self.hours_month = hours_month;
        }
        if let Some(store) = &args.store {
            self.store = store.clone();
        }
        self.force |= args.force;
    }

    pub fn import_config(&self) -> ImportConfig {
        ImportConfig {
            node: self.node.clone(),
            prices_url: self.prices_url.clone(),
            regions: self.regions.clone(),
            instance_type: self.instance_type.clone(),
            database_type: self.database_type.clone(),
            database_engine: self.database_engine.clone(),
            os: self.os.clone(),
            hours_month: self.hours_month,
            force: self.force,
        }
    }
}

fn default_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir).join("ovhcat")
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_store() -> PathBuf {
        default_dir(dirs::data_local_dir()).join("catalog.json")
    }

    pub fn default_log_dir() -> PathBuf {
        default_dir(dirs::cache_dir()).join("logs")
    }

    /// Defaults, then the optional TOML file, then `OVHCAT_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut builder = RConfig::builder()
            .set_default("node", DEFAULT_NODE)?
            .set_default("prices_url", DEFAULT_PRICES_URL)?
            .set_default("regions", MATCH_ALL)?
            .set_default("instance_type", MATCH_ALL)?
            .set_default("database_type", MATCH_ALL)?
            .set_default("database_engine", MATCH_ALL)?
            .set_default("os", MATCH_ALL)?
            .set_default("hours_month", DEFAULT_HOURS_MONTH)?
            .set_default("force", false)?
            .set_default("store", Self::default_store().to_string_lossy().to_string())?
            .set_default("log_dir", Self::default_log_dir().to_string_lossy().to_string())?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config = builder
            .build()
            .context("failed to load the configuration")?
            .try_deserialize()
            .context("failed to parse config file")?;
        Ok(config)
    }
}
