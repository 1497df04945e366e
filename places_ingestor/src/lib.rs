//! Places ratings ingestion.
//!
//! Turns a list of service providers into a dated, idempotently rewritable
//! ratings partition:
//!
//! 1. [`providers::google_places`] searches each provider by free text.
//! 2. [`enrich::EnrichmentRunner`] isolates per-provider failures and keeps input order.
//! 3. [`io::partition::PartitionWriter`] writes `{root}/{run_date}/ratings.csv`.
//! 4. [`io::mirror::ArtifactMirror`] copies it to durable storage under hive-style keys.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
pub mod ratings;
