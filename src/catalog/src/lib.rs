//! OVH public cloud price catalog: classification of the bulk price feeds,
//! normalization, admission filters and idempotent merge into a persisted
//! catalog.

pub mod classifier;
pub mod config;
pub mod constants;
pub mod context;
pub mod feed;
pub mod filter;
pub mod import;
pub mod install;
pub mod normalizer;
pub mod registry;
pub mod repository;
pub mod skip;
pub mod types;

pub use config::ImportConfig;
pub use feed::{FeedResource, FeedSource};
pub use import::CatalogImporter;
pub use repository::{CatalogChanges, CatalogRepository, CatalogSnapshot, MemoryRepository};
pub use skip::SkipReason;
pub use types::{ImportStatus, Phase};
