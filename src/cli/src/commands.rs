use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

fn about_message() -> String {
    format!(
        "Imports the OVH public cloud price catalog\nVersion: {}",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Parser, Clone, Debug)]
#[clap(name = "ovhcat", about = about_message(), version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// TOML configuration file
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, `RUST_LOG` takes precedence
    #[clap(long, global = true)]
    pub log_level: Option<String>,

    #[clap(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the price feeds and merge them into the stored catalog
    Install(Box<InstallArgs>),

    /// Show the counts of the stored catalog
    Status {
        #[clap(long, value_name = "FILE")]
        store: Option<PathBuf>,

        /// Output in JSON format
        #[clap(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Persist every touched entity, even unchanged ones
    #[clap(long)]
    pub force: bool,

    /// JSON file holding the catalog
    #[clap(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Catalog namespace
    #[clap(long)]
    pub node: Option<String>,

    #[clap(long, value_name = "URL")]
    pub prices_url: Option<String>,

    #[clap(long, value_name = "RE")]
    pub regions: Option<String>,

    #[clap(long, value_name = "RE")]
    pub instance_type: Option<String>,

    #[clap(long, value_name = "RE")]
    pub database_type: Option<String>,

    #[clap(long, value_name = "RE")]
    pub database_engine: Option<String>,

    #[clap(long, value_name = "RE")]
    pub os: Option<String>,

    #[clap(long, value_name = "N")]
    pub hours_month: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_flags() {
        let cli = Cli::parse_from([
            "ovhcat",
            "install",
            "--force",
            "--regions",
            "gra.*",
            "--hours-month",
            "720",
        ]);
        let Command::Install(args) = cli.command else {
            panic!("not an install command");
        };
        assert!(args.force);
        assert_eq!(args.regions.as_deref(), Some("gra.*"));
        assert_eq!(args.hours_month, Some(720.0));
        assert_eq!(args.os, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ovhcat", "status", "--json", "--config", "ovhcat.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("ovhcat.toml")));
        assert!(matches!(cli.command, Command::Status { json: true, .. }));
    }
}
