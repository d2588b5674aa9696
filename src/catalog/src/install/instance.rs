use tracing::{debug, info};

use super::Terms;
use crate::classifier::InstanceOffer;
use crate::context::UpdateContext;
use crate::feed::{CatalogFeeds, FlavorSpec};
use crate::filter::FilterKind;
use crate::skip::SkipReason;
use crate::types::{ComputeSpec, PriceDetail, Ratings, Tenancy, TypeSpec, VmOs};

/// OS variant of an offer with its raw hourly and monthly prices.
type Variant = (VmOs, Option<f64>, Option<f64>);

pub fn install_instances(
    ctx: &mut UpdateContext,
    feeds: &CatalogFeeds,
    offers: &[InstanceOffer],
    terms: &Terms,
) {
    for offer in offers {
        if let Err(reason) = install_instance(ctx, feeds, offer, terms) {
            ctx.skip(&offer.plan_code, Some(&offer.region), reason);
        }
    }
    info!(
        used_regions = ctx.used_regions().len(),
        "instance prices installed"
    );
}

fn install_instance(
    ctx: &mut UpdateContext,
    feeds: &CatalogFeeds,
    offer: &InstanceOffer,
    terms: &Terms,
) -> Result<(), SkipReason> {
    let shape = &offer.shape;
    if !ctx.is_admitted(FilterKind::Region, &offer.region)
        || !ctx.is_admitted(FilterKind::InstanceType, &shape.name)
    {
        return Ok(());
    }

    let flavor = if feeds.flavors.is_empty() {
        None
    } else {
        Some(
            feeds
                .flavor(&shape.name)
                .ok_or_else(|| SkipReason::UnknownFlavor(shape.name.clone()))?,
        )
    };

    let variants = os_variants(offer);
    if variants.is_empty() {
        return Err(SkipReason::NoPrice);
    }
    let admitted: Vec<Variant> = variants
        .into_iter()
        .filter(|(os, _, _)| ctx.is_admitted(FilterKind::Os, os.as_str()))
        .collect();
    if admitted.is_empty() {
        return Ok(());
    }

    let region = ctx.install_region(&offer.region);
    ctx.mark_used_region(&region);

    let type_code = shape.name.clone();
    ctx.install_type(&type_code, TypeSpec::Instance(ComputeSpec::default()), |t| {
        t.name = type_code.clone();
        t.spec = TypeSpec::Instance(compute_spec(offer, flavor));
    });

    let hours_month = ctx.config.hours_month;
    for (os, hourly, monthly) in admitted {
        for (term, cost) in terms.costs(hourly, monthly, hours_month) {
            let code = format!("{}/{}/{}/{}", os, region, term.code, type_code);
            ctx.install_price(
                &code,
                &type_code,
                PriceDetail::Instance {
                    os,
                    tenancy: Tenancy::Shared,
                },
                |p| {
                    p.location = Some(region.clone());
                    p.term = Some(term.code.clone());
                    p.period = term.period;
                },
                cost,
            );
        }
    }
    debug!(plan_code = %offer.plan_code, %region, "instance installed");
    Ok(())
}

/// Windows from the `windows.*` keys, Linux from `linux.*` or the generic keys.
fn os_variants(offer: &InstanceOffer) -> Vec<Variant> {
    let (windows_hourly, windows_monthly) = offer.prices.windows();
    let (linux_hourly, linux_monthly) = offer.prices.linux();
    [
        (VmOs::Linux, linux_hourly, linux_monthly),
        (VmOs::Windows, windows_hourly, windows_monthly),
    ]
    .into_iter()
    .filter(|(_, hourly, monthly)| hourly.is_some() || monthly.is_some())
    .collect()
}

fn compute_spec(offer: &InstanceOffer, flavor: Option<&FlavorSpec>) -> ComputeSpec {
    let shape = &offer.shape;
    let flavor_disk = flavor.and_then(|f| f.disk).map(|gb| format!("{gb} GB"));
    ComputeSpec {
        cpu: shape.cpu,
        ram: shape.ram,
        gpu: shape.gpu.clone(),
        nvme_disks: shape.nvme_disks.clone(),
        disk: shape.disk.clone().or(flavor_disk),
        public_network: shape.public_network.clone(),
        private_network: shape.private_network.clone(),
        inbound_bandwidth: flavor.and_then(|f| f.inbound_bandwidth),
        outbound_bandwidth: flavor.and_then(|f| f.outbound_bandwidth),
        os_family: flavor.and_then(|f| f.os_type.clone()),
        auto_scale: false,
        ratings: Ratings::default(),
    }
}
