//! Working set of one import run.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::filter::{CatalogFilters, FilterKind};
use crate::registry::{Handle, Registry};
use crate::repository::{CatalogChanges, CatalogSnapshot};
use crate::skip::SkipReason;
use crate::types::{
    Category, ImportStatus, Price, PriceDetail, PriceTerm, Region, RegionCatalog, ResourceType,
    TypeSpec,
};

#[derive(Debug, Clone, Default)]
struct PerCategory<T> {
    instance: T,
    database: T,
    storage: T,
    support: T,
}

impl<T> PerCategory<T> {
    fn get(&self, category: Category) -> &T {
        match category {
            Category::Instance => &self.instance,
            Category::Database => &self.database,
            Category::Storage => &self.storage,
            Category::Support => &self.support,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Instance => &mut self.instance,
            Category::Database => &mut self.database,
            Category::Storage => &mut self.storage,
            Category::Support => &mut self.support,
        }
    }
}

/// Seeded from the persisted catalog, mutated by the installers, drained
/// into the changes to save. Never shared between runs.
#[derive(Debug)]
pub struct UpdateContext {
    pub config: ImportConfig,
    filters: CatalogFilters,
    region_catalog: RegionCatalog,
    regions: Registry<Region>,
    terms: Registry<PriceTerm>,
    types: PerCategory<Registry<ResourceType>>,
    prices: PerCategory<Registry<Price>>,
    /// Regions with at least one admitted instance.
    used_regions: BTreeSet<String>,
    skipped: usize,
}

impl UpdateContext {
    pub fn new(config: ImportConfig, filters: CatalogFilters, region_catalog: RegionCatalog) -> Self {
        Self {
            config,
            filters,
            region_catalog,
            regions: Registry::new(),
            terms: Registry::new(),
            types: PerCategory::default(),
            prices: PerCategory::default(),
            used_regions: BTreeSet::new(),
            skipped: 0,
        }
    }

    pub fn seed(&mut self, snapshot: CatalogSnapshot) {
        self.regions.seed(snapshot.regions);
        self.terms.seed(snapshot.terms);
        for category in Category::ALL {
            self.types.get_mut(category).seed(
                snapshot
                    .types
                    .iter()
                    .filter(|t| t.category() == category)
                    .cloned(),
            );
            self.prices.get_mut(category).seed(
                snapshot
                    .prices
                    .iter()
                    .filter(|p| p.category() == category)
                    .cloned(),
            );
        }
    }

    pub fn is_admitted(&self, kind: FilterKind, candidate: &str) -> bool {
        let admitted = self.filters.is_admitted(kind, candidate);
        if !admitted {
            debug!(?kind, candidate, "filtered out");
        }
        admitted
    }

    pub fn skip(&mut self, plan_code: &str, region: Option<&str>, reason: SkipReason) {
        warn!(plan_code, region = region.unwrap_or_default(), %reason, "skipping offer");
        self.skipped += 1;
    }

    pub fn add_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn regions(&self) -> &Registry<Region> {
        &self.regions
    }

    pub fn terms(&self) -> &Registry<PriceTerm> {
        &self.terms
    }

    pub fn types(&self, category: Category) -> &Registry<ResourceType> {
        self.types.get(category)
    }

    pub fn prices(&self, category: Category) -> &Registry<Price> {
        self.prices.get(category)
    }

    /// Region entity for an admitted code, described from the region catalog.
    pub fn install_region(&mut self, code: &str) -> String {
        let code = code.to_lowercase();
        let handle = self.regions.get_or_insert_with(&code, || Region::new(&code));
        let info = self.region_catalog.describe(&code).cloned();
        self.regions.merge(handle, |region| {
            if let Some(info) = info {
                region.name = info.name;
                region.sub_region = info.sub_region;
                region.country = info.country_a2;
            }
        });
        code
    }

    pub fn install_term(&mut self, code: &str, period: u32) -> PriceTerm {
        let handle = self.terms.get_or_insert_with(code, || PriceTerm::new(code));
        self.terms.merge(handle, |term| {
            term.name = code.to_string();
            term.period = period;
            term.reservation = false;
            term.convertible_family = false;
            term.convertible_type = false;
            term.convertible_location = false;
            term.convertible_os = false;
            term.ephemeral = false;
        });
        self.terms.value(handle).clone()
    }

    pub fn mark_used_region(&mut self, code: &str) {
        self.used_regions.insert(code.to_lowercase());
    }

    pub fn used_regions(&self) -> &BTreeSet<String> {
        &self.used_regions
    }

    /// Look up or create a type, then merge its descriptive attributes.
    pub fn install_type(
        &mut self,
        code: &str,
        shell: TypeSpec,
        apply: impl FnOnce(&mut ResourceType),
    ) -> Handle {
        let registry = self.types.get_mut(shell.category());
        let handle = registry.get_or_insert_with(code, || ResourceType::new(code, shell));
        registry.merge(handle, apply);
        handle
    }

    /// Look up or create a price, merge its links and write its cost when it
    /// changed.
    pub fn install_price(
        &mut self,
        code: &str,
        type_code: &str,
        detail: PriceDetail,
        apply: impl FnOnce(&mut Price),
        cost: f64,
    ) -> Handle {
        let registry = self.prices.get_mut(detail.category());
        let handle = registry.get_or_insert_with(code, || Price::new(code, type_code, detail));
        registry.merge(handle, |price| {
            price.type_code = type_code.to_string();
            apply(price);
        });
        registry.update_cost(handle, cost);
        handle
    }

    pub fn fill_status(&self, status: &mut ImportStatus) {
        status.nb_locations = self.regions.touched_count();
        status.nb_instance_types = self.types.instance.touched_count();
        status.nb_instance_prices = self.prices.instance.touched_count();
        status.nb_database_types = self.types.database.touched_count();
        status.nb_database_prices = self.prices.database.touched_count();
        status.nb_storage_types = self.types.storage.touched_count();
        status.nb_storage_prices = self.prices.storage.touched_count();
        status.nb_support_prices = self.prices.support.touched_count();
        status.nb_skipped = self.skipped;
        status.nb_changed = self.changed_count();
    }

    pub fn changed_count(&self) -> usize {
        let mut count = self.regions.dirty_count() + self.terms.dirty_count();
        for category in Category::ALL {
            count += self.types.get(category).dirty_count();
            count += self.prices.get(category).dirty_count();
        }
        count
    }

    pub fn into_changes(self) -> CatalogChanges {
        let force = self.config.force;
        let mut changes = CatalogChanges {
            regions: self.regions.into_changes(force),
            terms: self.terms.into_changes(force),
            ..Default::default()
        };
        let PerCategory {
            instance,
            database,
            storage,
            support,
        } = self.types;
        for registry in [instance, database, storage, support] {
            changes.types.extend(registry.into_changes(force));
        }
        let PerCategory {
            instance,
            database,
            storage,
            support,
        } = self.prices;
        for registry in [instance, database, storage, support] {
            changes.prices.extend(registry.into_changes(force));
        }
        changes
    }
}
