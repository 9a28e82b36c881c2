//! Mortgage flood-risk scoring.
//!
//! The core is three pure steps (simulate, classify, estimate loss)
//! run over an in-memory portfolio by `pipeline::EnrichmentPipeline`.
//! Geocoding, the flood-zone overlay, the map and console input are
//! collaborators behind small interfaces.

pub mod classifier;
pub mod config;
pub mod error;
pub mod event;
pub mod flood_zones;
pub mod geocode;
pub mod loss;
pub mod map;
pub mod pipeline;
pub mod portfolio;
pub mod record_source;
pub mod rng;
pub mod simulator;
pub mod summary;
pub mod types;
