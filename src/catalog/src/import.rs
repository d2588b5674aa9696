use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};

use crate::classifier::CatalogOffers;
use crate::config::ImportConfig;
use crate::context::UpdateContext;
use crate::feed::{CatalogFeeds, FeedSource};
use crate::filter::CatalogFilters;
use crate::install::{
    install_databases, install_instances, install_storages, install_support, SupportCatalog,
    Terms,
};
use crate::repository::CatalogRepository;
use crate::types::{ImportStatus, Phase, RegionCatalog};

/// Runs the import phases against a feed source and a repository.
///
/// `install` takes `&mut self`: one importer never runs twice at once. Callers
/// sharing a repository between importers must serialize them.
pub struct CatalogImporter<F, R> {
    feed: F,
    repository: R,
    config: ImportConfig,
    status: watch::Sender<ImportStatus>,
}

impl<F: FeedSource, R: CatalogRepository> CatalogImporter<F, R> {
    pub fn new(feed: F, repository: R, config: ImportConfig) -> Self {
        let (status, _) = watch::channel(ImportStatus::new(&config.node));
        Self {
            feed,
            repository,
            config,
            status,
        }
    }

    /// Progress of the current or last run.
    pub fn subscribe(&self) -> watch::Receiver<ImportStatus> {
        self.status.subscribe()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Import the whole catalog. Changes are saved once, after every phase
    /// succeeded; a failed run saves nothing.
    pub async fn install(&mut self) -> Result<ImportStatus> {
        let mut status = ImportStatus::new(&self.config.node);
        let result = self.run(&mut status).await;
        status.finish(result.is_err());
        self.status.send_replace(status.clone());

        match result {
            Ok(()) => {
                info!(
                    node = %status.node,
                    locations = status.nb_locations,
                    instance_prices = status.nb_instance_prices,
                    database_prices = status.nb_database_prices,
                    storage_prices = status.nb_storage_prices,
                    support_prices = status.nb_support_prices,
                    skipped = status.nb_skipped,
                    changed = status.nb_changed,
                    "catalog import finished"
                );
                Ok(status)
            }
            Err(e) => {
                error!(node = %status.node, phase = ?status.phase, "catalog import failed: {e:#}");
                Err(e)
            }
        }
    }

    fn enter(&self, status: &mut ImportStatus, phase: Phase) {
        status.advance(phase);
        info!(%phase, done = status.done, workload = status.workload, "import phase");
        self.status.send_replace(status.clone());
    }

    async fn run(&mut self, status: &mut ImportStatus) -> Result<()> {
        let node = self.config.node.clone();

        self.enter(status, Phase::Initialize);
        let filters = CatalogFilters::compile(&self.config)?;
        let mut ctx = UpdateContext::new(self.config.clone(), filters, RegionCatalog::embedded()?);
        let support = SupportCatalog::embedded()?;
        let snapshot = self
            .repository
            .load(&node)
            .await
            .with_context(|| format!("failed to load the catalog of {node}"))?;
        ctx.seed(snapshot);

        self.enter(status, Phase::RetrieveCatalog);
        let feeds = CatalogFeeds::retrieve(&self.feed).await?;
        let offers = CatalogOffers::from_records(&feeds.prices);
        ctx.add_skipped(offers.skipped);
        let terms = Terms::install(&mut ctx);

        self.enter(status, Phase::InstallVm);
        install_instances(&mut ctx, &feeds, &offers.instances, &terms);
        ctx.fill_status(status);

        self.enter(status, Phase::InstallDatabase);
        install_databases(&mut ctx, &feeds, &offers.databases, &terms);
        ctx.fill_status(status);

        self.enter(status, Phase::InstallVmStorage);
        install_storages(&mut ctx, &offers.storages);
        ctx.fill_status(status);

        self.enter(status, Phase::InstallSupport);
        install_support(&mut ctx, &support);
        ctx.fill_status(status);

        let changes = ctx.into_changes();
        self.repository
            .save(&node, changes)
            .await
            .with_context(|| format!("failed to save the catalog of {node}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedResource;
    use crate::repository::MemoryRepository;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct BrokenFeed;

    #[async_trait]
    impl FeedSource for BrokenFeed {
        async fn fetch(&self, resource: FeedResource) -> Result<Option<Value>> {
            match resource {
                FeedResource::Prices => Ok(Some(json!([]))),
                _ => Err(anyhow!("connection reset")),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_saves_nothing() {
        let mut importer =
            CatalogImporter::new(BrokenFeed, MemoryRepository::new(), ImportConfig::default());
        let progress = importer.subscribe();

        let err = importer.install().await.unwrap_err();
        assert!(format!("{err:#}").contains("connection reset"));

        let status = progress.borrow().clone();
        assert!(status.failed);
        assert_eq!(status.phase, Some(Phase::RetrieveCatalog));
        assert_eq!(importer.repository().saves, 0);
    }

    #[tokio::test]
    async fn test_invalid_filter_fails_before_fetch() {
        let config = ImportConfig {
            regions: "[".into(),
            ..Default::default()
        };
        let mut importer = CatalogImporter::new(BrokenFeed, MemoryRepository::new(), config);
        let err = importer.install().await.unwrap_err();
        assert!(err.to_string().contains("invalid regions pattern"));
    }
}
