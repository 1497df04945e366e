//! End-to-end bronze run.
//!
//! Order of operations, each fatal on failure:
//! 1. ensure warehouse datasets
//! 2. seed `providers.csv` if the run has none
//! 3. enrich providers and write the local partition
//! 4. mirror the partition to object storage
//! 5. refresh the external table over every mirrored run
//! 6. run the transform scripts
//! 7. require a non-empty sanity view
//!
//! Per-provider lookup failures are not fatal; they are logged by the runner
//! and counted in [`PipelineOutcome::run`]. A failure in any step leaves the
//! earlier steps' output in place.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use object_store::{ObjectStore, path::Path as ObjectPath};
use places_ingestor::{
    io::{
        mirror::ArtifactMirror,
        partition::{ARTIFACT_FILE_NAME, PartitionKey, PartitionWriter},
        seed::seed_providers_if_missing,
    },
    providers::PlaceLookup,
    ratings::{RatingsRun, fetch_ratings},
};
use secrecy::SecretString;
use shared_utils::env::get_required_env_var;
use tracing::info;

use crate::{
    catalog::{
        listing::ObjectStoreLister,
        refresh::{CatalogClient, CatalogUpdateResult, ExternalCatalogRefresher},
    },
    config::PipelineConfig,
    warehouse::Warehouse,
};

/// Every secret a run needs, resolved before anything else happens.
pub struct Credentials {
    pub places_api_key: SecretString,
    pub warehouse_token: SecretString,
}

impl Credentials {
    pub fn resolve(config: &PipelineConfig) -> anyhow::Result<Self> {
        let places_api_key = config
            .places
            .api_key()
            .context("places API key is required")?;
        let warehouse_token = get_required_env_var(&config.warehouse.access_token_env)
            .context("warehouse access token is required")?
            .into();
        Ok(Self {
            places_api_key,
            warehouse_token,
        })
    }
}

/// External services a run talks to.
pub struct PipelineDeps<'a> {
    pub lookup: &'a dyn PlaceLookup,
    pub store: Arc<dyn ObjectStore>,
    pub uri_root: String,
    pub catalog: &'a dyn CatalogClient,
    pub warehouse: &'a dyn Warehouse,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub providers_seeded: bool,
    pub run: RatingsRun,
    pub uploaded: ObjectPath,
    pub catalog: CatalogUpdateResult,
    pub sanity_rows: u64,
}

/// `{local_root}/{run_date}/providers.csv`
pub fn providers_path(config: &PipelineConfig, run_date: NaiveDate) -> PathBuf {
    config
        .storage
        .local_root
        .join(run_date.format("%Y-%m-%d").to_string())
        .join("providers.csv")
}

pub async fn run_pipeline(
    config: &PipelineConfig,
    run_date: NaiveDate,
    deps: &PipelineDeps<'_>,
) -> anyhow::Result<PipelineOutcome> {
    let storage = &config.storage;
    let warehouse = &config.warehouse;

    for dataset in &warehouse.datasets {
        deps.warehouse
            .ensure_dataset(dataset)
            .await
            .with_context(|| format!("ensure dataset {dataset}"))?;
    }

    let providers_csv = providers_path(config, run_date);
    let providers_seeded = seed_providers_if_missing(&providers_csv)
        .with_context(|| format!("seed {}", providers_csv.display()))?;

    let writer = PartitionWriter::new(storage.local_root.clone());
    let key = PartitionKey::new(storage.source.clone(), run_date);
    let run = fetch_ratings(deps.lookup, &config.ingestor(), &providers_csv, &writer, &key)
        .await
        .context("ratings run failed")?;

    let mirror = ArtifactMirror::new(deps.store.clone(), storage.dataset_prefix.clone());
    let uploaded = mirror
        .upload(&run.artifact)
        .await
        .context("mirror ratings partition")?;

    let lister = ObjectStoreLister::new(deps.store.clone(), deps.uri_root.clone(), ARTIFACT_FILE_NAME);
    let catalog = ExternalCatalogRefresher::new(&lister, deps.catalog)
        .refresh(&warehouse.ratings_table, &storage.dataset_prefix)
        .await
        .with_context(|| format!("refresh {}", warehouse.ratings_table))?;

    for script in &warehouse.transform_sql {
        let sql = tokio::fs::read_to_string(script)
            .await
            .with_context(|| format!("read transform {}", script.display()))?;
        deps.warehouse
            .execute(&sql)
            .await
            .with_context(|| format!("transform {}", script.display()))?;
        info!(script = %script.display(), "applied transform");
    }

    let sanity_rows = deps
        .warehouse
        .count_rows(&warehouse.sanity_view)
        .await
        .with_context(|| format!("count rows in {}", warehouse.sanity_view))?;
    if sanity_rows == 0 {
        bail!("sanity check failed: {} is empty", warehouse.sanity_view);
    }

    info!(
        %run_date,
        rows = run.artifact.row_count,
        failed = run.report.failed(),
        not_found = run.report.not_found(),
        uri_count = catalog.definition.source_uris.len(),
        sanity_rows,
        "bronze run complete"
    );
    Ok(PipelineOutcome {
        providers_seeded,
        run,
        uploaded,
        catalog,
        sanity_rows,
    })
}
