//! Fetches M3U playlists, probes every stream for reachability and emits
//! curated, categorized playlists.

pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod proxy;
pub mod report;
pub mod services;
pub mod storage;
pub mod utils;
