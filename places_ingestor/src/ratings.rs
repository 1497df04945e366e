//! One ratings run: read providers, enrich, write the dated partition.

use std::path::Path;

use tracing::info;

use crate::{
    config::IngestorConfig,
    enrich::{EnrichmentReport, EnrichmentRunner},
    errors::Error,
    io::{
        partition::{PartitionArtifact, PartitionKey, PartitionWriter},
        sink::DataSink,
    },
    models::provider::read_providers,
    providers::PlaceLookup,
};

/// Source label used in storage partition paths.
pub const DEFAULT_SOURCE: &str = "google_places";

/// Outcome of [`fetch_ratings`].
#[derive(Debug)]
pub struct RatingsRun {
    pub report: EnrichmentReport,
    pub artifact: PartitionArtifact,
}

/// Reads `providers_csv`, looks every provider up, and writes the partition
/// for `key` through `writer`.
///
/// Lookup failures are isolated per provider and never fail the run; an
/// unreadable input or an unwritable destination does.
pub async fn fetch_ratings<L: PlaceLookup + ?Sized>(
    lookup: &L,
    config: &IngestorConfig,
    providers_csv: &Path,
    writer: &PartitionWriter,
    key: &PartitionKey,
) -> Result<RatingsRun, Error> {
    let providers = read_providers(providers_csv)?;
    info!(
        path = %providers_csv.display(),
        providers = providers.len(),
        run_date = %key.run_date,
        "starting ratings run"
    );

    let runner = EnrichmentRunner::new(
        lookup,
        config.query.clone(),
        config.retry.clone(),
        key.run_date,
    );
    let report = runner.run(&providers).await;
    let artifact = writer.write(&report.rows, key).await?;

    Ok(RatingsRun { report, artifact })
}
