use tracing::{debug, info};

use crate::classifier::{StorageKind, StorageOffer};
use crate::constants::VOLUME_MAXIMAL_GIB;
use crate::context::UpdateContext;
use crate::filter::FilterKind;
use crate::normalizer::round3;
use crate::skip::SkipReason;
use crate::types::{PriceDetail, Rate, StorageOptimized, StorageSpec, TypeSpec};

/// Human name and performance class of a storage type.
pub fn storage_descriptor(kind: StorageKind, code: &str) -> (String, StorageSpec) {
    let base = StorageSpec {
        minimal: 1.0,
        availability: 99.0,
        ..Default::default()
    };
    let durable = |iops, throughput, latency| StorageSpec {
        iops,
        throughput,
        latency,
        durability9: 11,
        optimized: StorageOptimized::Durability,
        ..base.clone()
    };

    match kind {
        StorageKind::Snapshot => ("Storage replicated x3".into(), durable(7500, 300, Rate::Low)),
        StorageKind::Object => ("Object Storage".into(), durable(5000, 200, Rate::Good)),
        StorageKind::Archive => ("Cloud Archive".into(), durable(7500, 300, Rate::Worst)),
        StorageKind::Volume => {
            let (name, iops) = match code {
                "volume.classic" => ("Classic".to_string(), 250),
                "volume.high-speed" => ("High speed".to_string(), 3000),
                "volume.high-speed-gen2" => ("High speed Gen2".to_string(), 20000),
                other => (other.to_string(), 7500),
            };
            let spec = StorageSpec {
                iops,
                throughput: 300,
                latency: Rate::Best,
                durability9: 7,
                optimized: StorageOptimized::Iops,
                maximal: Some(VOLUME_MAXIMAL_GIB),
                instance_type: Some("%".into()),
                ..base.clone()
            };
            (name, spec)
        }
    }
}

pub fn install_storages(ctx: &mut UpdateContext, offers: &[StorageOffer]) {
    for offer in offers {
        if let Err(reason) = install_storage(ctx, offer) {
            ctx.skip(&offer.plan_code, Some(&offer.region), reason);
        }
    }
    info!("storage prices installed");
}

fn install_storage(ctx: &mut UpdateContext, offer: &StorageOffer) -> Result<(), SkipReason> {
    if !ctx.is_admitted(FilterKind::Region, &offer.region) {
        return Ok(());
    }
    let cost = match offer.cost() {
        Some(cost) => round3(cost),
        None if offer.shape.included => {
            debug!(plan_code = %offer.plan_code, "storage price included");
            return Ok(());
        }
        None => return Err(SkipReason::NoPrice),
    };

    let type_code = offer.shape.code.clone();
    let (name, spec) = storage_descriptor(offer.shape.kind, &type_code);
    ctx.install_type(&type_code, TypeSpec::Storage(StorageSpec::default()), |t| {
        t.name = name;
        t.spec = TypeSpec::Storage(spec);
    });

    let region = ctx.install_region(&offer.region);
    ctx.install_price(
        &format!("{}/{}", region, type_code),
        &type_code,
        PriceDetail::Storage,
        |p| p.location = Some(region.clone()),
        cost,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CatalogOffers;
    use crate::config::ImportConfig;
    use crate::filter::CatalogFilters;
    use crate::types::{Category, RegionCatalog};
    use rstest::rstest;
    use serde_json::json;

    fn context(config: ImportConfig) -> UpdateContext {
        let filters = CatalogFilters::compile(&config).unwrap();
        UpdateContext::new(config, filters, RegionCatalog::embedded().unwrap())
    }

    #[rstest]
    #[case::classic(StorageKind::Volume, "volume.classic", "Classic", 250)]
    #[case::high_speed(StorageKind::Volume, "volume.high-speed", "High speed", 3000)]
    #[case::gen2(StorageKind::Volume, "volume.high-speed-gen2", "High speed Gen2", 20000)]
    #[case::unknown_volume(StorageKind::Volume, "volume.fast", "volume.fast", 7500)]
    #[case::snapshot(StorageKind::Snapshot, "snapshot", "Storage replicated x3", 7500)]
    #[case::object(StorageKind::Object, "storage", "Object Storage", 5000)]
    #[case::archive(StorageKind::Archive, "archive", "Cloud Archive", 7500)]
    fn test_descriptor(
        #[case] kind: StorageKind,
        #[case] code: &str,
        #[case] name: &str,
        #[case] iops: u32,
    ) {
        let (actual, spec) = storage_descriptor(kind, code);
        assert_eq!(actual, name);
        assert_eq!(spec.iops, iops);
        assert_eq!(spec.minimal, 1.0);
        assert_eq!(spec.availability, 99.0);
    }

    #[test]
    fn test_volume_is_attachable_everywhere() {
        let (_, spec) = storage_descriptor(StorageKind::Volume, "volume.classic");
        assert_eq!(spec.maximal, Some(4096.0));
        assert_eq!(spec.instance_type.as_deref(), Some("%"));
        assert_eq!(spec.latency, Rate::Best);
        assert_eq!(spec.durability9, 7);
    }

    #[test]
    fn test_classic_volume_round_trip() {
        let mut ctx = context(ImportConfig::default());
        let offers = CatalogOffers::from_records(&[json!({
            "planCode": "volume.classic.consumption",
            "GRA7": {"value": 0.04, "currencyCode": "EUR"}
        })]);
        install_storages(&mut ctx, &offers.storages);

        let ty = ctx.types(Category::Storage).get("volume.classic").unwrap();
        assert_eq!(ty.name, "Classic");
        let TypeSpec::Storage(spec) = &ty.spec else {
            panic!("not a storage type");
        };
        assert_eq!(spec.iops, 250);

        let price = ctx.prices(Category::Storage).get("gra7/volume.classic").unwrap();
        assert_eq!(price.cost, 0.04);
        assert_eq!(price.location.as_deref(), Some("gra7"));
        assert!(ctx.used_regions().is_empty());
    }

    #[rstest]
    #[case::number(json!(0.040))]
    #[case::text(json!("0.040"))]
    fn test_region_named_key_is_a_location(#[case] value: serde_json::Value) {
        let mut ctx = context(ImportConfig::default());
        let offers = CatalogOffers::from_records(&[json!({
            "planCode": "volume.classic.consumption",
            "region": {"value": value, "currencyCode": "EUR"}
        })]);
        install_storages(&mut ctx, &offers.storages);

        let ty = ctx.types(Category::Storage).get("volume.classic").unwrap();
        assert_eq!(ty.name, "Classic");
        let TypeSpec::Storage(spec) = &ty.spec else {
            panic!("not a storage type");
        };
        assert_eq!(spec.iops, 250);

        let price = ctx.prices(Category::Storage).get("region/volume.classic").unwrap();
        assert_eq!(price.cost, 0.04);
        assert_eq!(price.location.as_deref(), Some("region"));
        assert_eq!(ctx.prices(Category::Storage).len(), 1);
    }

    #[test]
    fn test_included_and_missing_prices() {
        let mut ctx = context(ImportConfig::default());
        let offers = CatalogOffers::from_records(&[
            json!({"planCode": "storage.consumption", "attr-1": "Included", "GRA": 0.01}),
            json!({"planCode": "archive.consumption", "GRA": "Included"}),
        ]);
        install_storages(&mut ctx, &offers.storages);

        assert!(ctx.prices(Category::Storage).is_empty());
        assert_eq!(ctx.skipped(), 1);
    }
}
