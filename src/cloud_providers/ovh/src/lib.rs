//! Retrieval of the OVH public cloud price feeds over HTTP.

pub mod client;

pub use client::HttpFeedClient;
