use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use super::Terms;
use crate::classifier::{DatabaseOffer, DatabaseShape};
use crate::constants::ALL_REGIONS;
use crate::context::UpdateContext;
use crate::feed::{CatalogFeeds, DatabaseAvailability};
use crate::filter::FilterKind;
use crate::normalizer::parse_quantity;
use crate::skip::SkipReason;
use crate::types::{DatabaseSpec, PriceDetail, Ratings, TypeSpec};

/// Attributes of a database type gathered over every engine offering it,
/// so a type shared by several engines merges to the same value each run
/// whatever the feed order.
#[derive(Debug, Default)]
struct TypeSummary {
    engines: BTreeSet<String>,
    min_nodes: Option<u32>,
    max_nodes: Option<u32>,
    min_disk: Option<u32>,
    max_disk: Option<u32>,
    cpu: f64,
    ram: u32,
    storage: Option<String>,
    public_network: Option<String>,
    private_network: Option<String>,
    dedicated_node: Option<String>,
}

impl TypeSummary {
    fn of(shape: &DatabaseShape) -> Self {
        let mut summary = Self::default();
        summary.engines.insert(shape.engine.clone());
        summary.absorb(shape);
        summary
    }

    /// Largest value of each shape attribute.
    fn absorb(&mut self, shape: &DatabaseShape) {
        self.cpu = self.cpu.max(shape.cpu);
        self.ram = self.ram.max(shape.ram);
        self.storage = largest_storage(self.storage.take(), shape.storage.clone());
        self.public_network = self.public_network.take().max(shape.public_network.clone());
        self.private_network = self.private_network.take().max(shape.private_network.clone());
        self.dedicated_node = self.dedicated_node.take().max(shape.dedicated_node.clone());
    }
}

fn largest_storage(a: Option<String>, b: Option<String>) -> Option<String> {
    let size = |s: &String| parse_quantity(s).unwrap_or(0.0);
    match (a, b) {
        (Some(a), Some(b)) => {
            let (sa, sb) = (size(&a), size(&b));
            if sb > sa || (sb == sa && b > a) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

fn lowest(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn highest(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    a.max(b)
}

pub fn install_databases(
    ctx: &mut UpdateContext,
    feeds: &CatalogFeeds,
    offers: &[DatabaseOffer],
    terms: &Terms,
) {
    let admitted: Vec<&DatabaseOffer> = offers
        .iter()
        .filter(|o| {
            ctx.is_admitted(FilterKind::DatabaseEngine, &o.shape.engine)
                && ctx.is_admitted(FilterKind::DatabaseType, &o.shape.flavor)
        })
        .collect();
    let summaries = summarize(feeds, &admitted);

    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
    for &offer in &admitted {
        if let Some(group) = offer.region_group.as_deref() {
            groups.entry(offer.plan_code.as_str()).or_default().push(group);
        }
    }

    for offer in admitted {
        let siblings = groups.get(offer.plan_code.as_str()).map_or(&[][..], Vec::as_slice);
        if let Err(reason) = install_database(ctx, feeds, offer, terms, &summaries, siblings) {
            ctx.skip(&offer.plan_code, offer.region_group.as_deref(), reason);
        }
    }
    info!("database prices installed");
}

fn summarize(feeds: &CatalogFeeds, offers: &[&DatabaseOffer]) -> BTreeMap<String, TypeSummary> {
    let mut summaries: BTreeMap<String, TypeSummary> = BTreeMap::new();
    for offer in offers {
        let shape = &offer.shape;
        let rows: Vec<&DatabaseAvailability> = feeds
            .availability_of(&shape.engine, &shape.plan, &shape.flavor)
            .collect();
        if !feeds.availability.is_empty() && rows.is_empty() {
            continue;
        }
        let summary = summaries.entry(shape.type_code()).or_default();
        summary.absorb(shape);
        if !summary.engines.insert(shape.engine.clone()) {
            continue;
        }
        for row in rows {
            summary.min_nodes = lowest(summary.min_nodes, row.min_node_number);
            summary.max_nodes = highest(summary.max_nodes, row.max_node_number);
            summary.min_disk = lowest(summary.min_disk, row.min_disk_size);
            summary.max_disk = highest(summary.max_disk, row.max_disk_size);
        }
    }
    summaries
}

fn install_database(
    ctx: &mut UpdateContext,
    feeds: &CatalogFeeds,
    offer: &DatabaseOffer,
    terms: &Terms,
    summaries: &BTreeMap<String, TypeSummary>,
    siblings: &[&str],
) -> Result<(), SkipReason> {
    let shape = &offer.shape;

    let availability: Vec<&DatabaseAvailability> = feeds
        .availability_of(&shape.engine, &shape.plan, &shape.flavor)
        .collect();
    if !feeds.availability.is_empty() && availability.is_empty() {
        return Err(SkipReason::UnavailableDatabase(shape.plan_code()));
    }

    let (hourly, monthly) = match offer.prices.terms() {
        (None, None) => feeds
            .plan_prices
            .get(&offer.plan_code)
            .map(|p| (p.hourly, p.monthly))
            .ok_or(SkipReason::MissingPlanPrice)?,
        regional => regional,
    };
    let costs = terms.costs(hourly, monthly, ctx.config.hours_month);
    if costs.is_empty() {
        return Err(SkipReason::MissingPlanPrice);
    }

    let regions = eligible_regions(ctx, offer.region_group.as_deref(), siblings, &availability);
    if regions.is_empty() {
        debug!(plan_code = %offer.plan_code, "no used region for this database");
        return Ok(());
    }

    let type_code = shape.type_code();
    let own;
    let summary = match summaries.get(&type_code) {
        Some(summary) => summary,
        None => {
            own = TypeSummary::of(shape);
            &own
        }
    };
    let description = describe(feeds, shape, summary);
    let spec = database_spec(feeds, shape, summary);
    ctx.install_type(&type_code, TypeSpec::Database(DatabaseSpec::default()), |t| {
        t.name = type_code.clone();
        t.description = description;
        t.spec = TypeSpec::Database(spec);
    });

    let engine = shape.engine.to_uppercase();
    let local_code = shape.plan_code();
    for region in regions {
        let region = ctx.install_region(&region);
        for (term, cost) in &costs {
            let code = format!("{}/{}/{}", region, term.code, local_code);
            ctx.install_price(
                &code,
                &type_code,
                PriceDetail::Database {
                    engine: engine.clone(),
                },
                |p| {
                    p.location = Some(region.clone());
                    p.term = Some(term.code.clone());
                    p.period = term.period;
                },
                *cost,
            );
        }
    }
    Ok(())
}

fn in_group(region: &str, group: Option<&str>) -> bool {
    match group {
        None => true,
        Some(group) if group.eq_ignore_ascii_case(ALL_REGIONS) => true,
        Some(group) => region.starts_with(&group.to_lowercase()),
    }
}

/// `all` matches everything, a longer prefix is narrower.
fn specificity(group: Option<&str>) -> usize {
    match group {
        Some(group) if !group.eq_ignore_ascii_case(ALL_REGIONS) => group.len(),
        _ => 0,
    }
}

/// Used instance regions of the offer's group, narrowed to the availability
/// groups when the availability feed lists the offer. A region also matched
/// by a narrower group of the same plan code belongs to that group.
fn eligible_regions(
    ctx: &UpdateContext,
    group: Option<&str>,
    siblings: &[&str],
    availability: &[&DatabaseAvailability],
) -> Vec<String> {
    let own = specificity(group);
    ctx.used_regions()
        .iter()
        .filter(|region| in_group(region, group))
        .filter(|region| {
            !siblings
                .iter()
                .any(|&other| specificity(Some(other)) > own && in_group(region, Some(other)))
        })
        .filter(|region| {
            availability.is_empty()
                || availability
                    .iter()
                    .any(|a| in_group(region, a.region.as_deref()))
        })
        .cloned()
        .collect()
}

fn describe(feeds: &CatalogFeeds, shape: &DatabaseShape, summary: &TypeSummary) -> Option<String> {
    let plan = feeds
        .capabilities
        .plan(&shape.plan)
        .and_then(|p| p.description.clone());
    let engines: Vec<String> = summary
        .engines
        .iter()
        .map(|e| {
            feeds
                .capabilities
                .engine(e)
                .and_then(|c| c.description.clone())
                .unwrap_or_else(|| e.clone())
        })
        .collect();

    match (plan, engines.is_empty()) {
        (None, true) => None,
        (Some(plan), true) => Some(plan),
        (None, false) => Some(engines.join(", ")),
        (Some(plan), false) => Some(format!("{} ({})", plan, engines.join(", "))),
    }
}

fn database_spec(
    feeds: &CatalogFeeds,
    shape: &DatabaseShape,
    summary: &TypeSummary,
) -> DatabaseSpec {
    DatabaseSpec {
        cpu: summary.cpu,
        ram: summary.ram,
        storage: summary.storage.clone(),
        public_network: summary.public_network.clone(),
        private_network: summary.private_network.clone(),
        dedicated_node: summary.dedicated_node.clone(),
        min_nodes: summary.min_nodes,
        max_nodes: summary.max_nodes,
        min_disk: summary.min_disk,
        max_disk: summary.max_disk,
        backup_retention: feeds
            .capabilities
            .plan(&shape.plan)
            .and_then(|p| p.backup_retention.clone()),
        auto_scale: false,
        ratings: Ratings::default(),
    }
}
