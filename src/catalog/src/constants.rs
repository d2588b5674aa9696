/// Catalog namespace the OVH types and prices belong to.
pub const DEFAULT_NODE: &str = "service:prov:ovh";

/// Base URL of the bulk price feeds.
pub const DEFAULT_PRICES_URL: &str = "https://da9smdsh48mvy.cloudfront.net/cloud";

/// Average month, not calendar exact.
pub const DEFAULT_HOURS_MONTH: f64 = 730.0;

/// Admission pattern used when an option is not configured.
pub const MATCH_ALL: &str = ".*";

pub const HOURLY_TERM: &str = "consumption";
pub const HOURLY_TERM_PERIOD: u32 = 0;
pub const MONTHLY_TERM: &str = "monthly.postpaid";
pub const MONTHLY_TERM_PERIOD: u32 = 1;

/// Key-value store engine, never imported as a database.
pub const EXCLUDED_ENGINE: &str = "redis";

/// Marker used by the vendor for a price bundled in another offer.
pub const INCLUDED_SENTINEL: &str = "Included";

/// Monetary values are kept with three decimals.
pub const COST_SCALE: f64 = 1000.0;
pub const COST_EPSILON: f64 = 1e-6;

pub const GIB_TO_MIB: f64 = 1024.0;

/// Region group key matching every used region.
pub const ALL_REGIONS: &str = "all";

pub const PLAN_CODE_KEY: &str = "planCode";
pub const TERM_KEY: &str = "term";
pub const REGIONS_KEY: &str = "regions";
pub const ATTRIBUTE_PREFIX: &str = "attr-";

pub const DATABASE_PREFIX: &str = "databases.";
pub const DATABASE_SUFFIX: &str = ".hour.consumption";
pub const CONSUMPTION_SUFFIX: &str = ".consumption";
pub const SNAPSHOT_SUFFIX: &str = ".snapshot";

pub const OBJECT_STORAGE_TYPE: &str = "storage";
pub const ARCHIVE_TYPE: &str = "archive";
pub const SNAPSHOT_TYPE: &str = "snapshot";

/// Maximal size of a block storage volume, in GiB.
pub const VOLUME_MAXIMAL_GIB: f64 = 4.0 * 1024.0;
