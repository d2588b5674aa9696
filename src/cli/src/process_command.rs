use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ovhcat_catalog::types::{Category, ImportStatus};
use ovhcat_catalog::{CatalogImporter, CatalogSnapshot};
use ovhcat_ovh::HttpFeedClient;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::commands::{Cli, Command, InstallArgs};
use crate::config::{Config, ConfigLoader};
use crate::logging::setup_logging;
use crate::store::JsonFileRepository;

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }

    match cli.command {
        Command::Install(args) => {
            let _guard = setup_logging(&config.log_level, &config.log_dir)?;
            tokio::runtime::Runtime::new()?.block_on(install(config, &args))
        }
        Command::Status { store, json } => {
            let store = store.unwrap_or_else(|| config.store.clone());
            tokio::runtime::Runtime::new()?.block_on(print_store(&store, json))
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn install(mut config: Config, args: &InstallArgs) -> Result<()> {
    config.apply(args);
    let feed = HttpFeedClient::new(&config.prices_url)?;
    let repository = JsonFileRepository::new(&config.store);
    let mut importer = CatalogImporter::new(feed, repository, config.import_config());

    let mut progress = importer.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let status = progress.borrow_and_update().clone();
            if let Some(phase) = status.phase {
                println!("[{}/{}] {}", status.done, status.workload, phase);
            }
        }
    });

    let result = importer.install().await;
    drop(importer);
    // the channel closes with the importer
    join_reporter(reporter).await;

    let status = result.context("catalog import failed")?;
    print_summary(&status);
    println!("Catalog stored in {}", config.store.display());
    Ok(())
}

/// A failed progress display never fails the import.
async fn join_reporter(reporter: JoinHandle<()>) {
    if let Err(e) = reporter.await {
        warn!(error = ?e, "progress reporter failed");
    }
}

pub fn print_summary(status: &ImportStatus) {
    println!("{}", "Import finished".green().bold());
    let rows = [
        ("Locations", status.nb_locations),
        ("Instance types", status.nb_instance_types),
        ("Instance prices", status.nb_instance_prices),
        ("Database types", status.nb_database_types),
        ("Database prices", status.nb_database_prices),
        ("Storage types", status.nb_storage_types),
        ("Storage prices", status.nb_storage_prices),
        ("Support prices", status.nb_support_prices),
        ("Skipped records", status.nb_skipped),
        ("Changed entities", status.nb_changed),
    ];
    for (label, count) in rows {
        println!("  {:<18} {}", label, count);
    }
}

fn snapshot_counts(snapshot: &CatalogSnapshot) -> serde_json::Value {
    let mut types = serde_json::Map::new();
    let mut prices = serde_json::Map::new();
    for category in Category::ALL {
        types.insert(category.to_string(), json!(snapshot.count_types(category)));
        prices.insert(category.to_string(), json!(snapshot.count_prices(category)));
    }
    json!({
        "regions": snapshot.regions.len(),
        "terms": snapshot.terms.len(),
        "types": types,
        "prices": prices,
    })
}

async fn print_store(path: &Path, as_json: bool) -> Result<()> {
    let catalogs = JsonFileRepository::new(path).read().await?;
    if as_json {
        let nodes: serde_json::Map<String, serde_json::Value> = catalogs
            .nodes
            .iter()
            .map(|(node, snapshot)| (node.clone(), snapshot_counts(snapshot)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if catalogs.nodes.is_empty() {
        println!("{} {}", "No catalog stored in".yellow(), path.display());
        return Ok(());
    }
    for (node, snapshot) in &catalogs.nodes {
        println!("{}", node.bold());
        println!("  {:<10} {}", "Regions", snapshot.regions.len());
        println!("  {:<10} {}", "Terms", snapshot.terms.len());
        for category in Category::ALL {
            println!(
                "  {:<10} {} types, {} prices",
                category.to_string(),
                snapshot.count_types(category),
                snapshot.count_prices(category)
            );
        }
    }
    Ok(())
}
