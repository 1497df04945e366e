//! Pipeline configuration: parsing, environment overrides, and validation.
//!
//! One TOML file drives the whole bronze run. The `[places]`, `[query]` and
//! `[retry]` sections are the ingestor's own settings and are handed to it
//! unchanged (see [`PipelineConfig::ingestor`]). `[storage]` says where
//! partitions land; `[warehouse]` names the datasets, the external table, the
//! transform scripts, and the view that must come out non-empty.
//!
//! Every field has a default. Two values are usually supplied by the
//! deployment environment instead of the file:
//! - `GCS_BUCKET` overrides `storage.bucket`
//! - `GCP_PROJECT_ID` overrides `warehouse.project_id`
//!
//! Entrypoints: [`load_config_str`] and [`load_config_path`].

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use places_ingestor::{
    config::{IngestorConfig, PlacesConfig, QueryConfig, RetryConfig},
    ratings::DEFAULT_SOURCE,
};
use serde::{Deserialize, Serialize};
use shared_utils::env::get_env_override;

use crate::catalog::TableRef;

pub const BUCKET_ENV: &str = "GCS_BUCKET";
pub const PROJECT_ENV: &str = "GCP_PROJECT_ID";
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    pub places: PlacesConfig,
    pub query: QueryConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub warehouse: WarehouseConfig,
}

/// Where partition artifacts are written and mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StorageConfig {
    /// Durable-storage bucket. Required unless `mirror_root` is set.
    pub bucket: Option<String>,
    /// Local directory used as the object store instead of the bucket.
    pub mirror_root: Option<PathBuf>,
    /// Local working tree: `{local_root}/{run_date}/providers.csv|ratings.csv`.
    pub local_root: PathBuf,
    /// `source=` partition value.
    pub source: String,
    /// Object prefix above the `source=`/`run_date=` directories.
    pub dataset_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            mirror_root: None,
            local_root: PathBuf::from("data/bronze"),
            source: DEFAULT_SOURCE.to_string(),
            dataset_prefix: "bronze/ratings".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WarehouseConfig {
    pub project_id: Option<String>,
    /// Datasets created if missing, in order.
    pub datasets: Vec<String>,
    /// External table over the ratings partitions (`dataset.table`).
    pub ratings_table: String,
    /// SQL files run in order after the refresh.
    pub transform_sql: Vec<PathBuf>,
    /// Relation whose row count must be positive at the end of a run.
    pub sanity_view: String,
    pub access_token_env: String,
    pub timeout_secs: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            datasets: vec![
                "sw_bronze".to_string(),
                "sw_silver".to_string(),
                "sw_gold".to_string(),
            ],
            ratings_table: "sw_bronze.ratings_ext".to_string(),
            transform_sql: Vec::new(),
            sanity_view: "sw_gold.provider_map_v".to_string(),
            access_token_env: DEFAULT_ACCESS_TOKEN_ENV.to_string(),
            timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// The ingestor's slice of the configuration.
    pub fn ingestor(&self) -> IngestorConfig {
        IngestorConfig {
            places: self.places.clone(),
            query: self.query.clone(),
            retry: self.retry.clone(),
        }
    }

    /// Applies `GCS_BUCKET` and `GCP_PROJECT_ID` when they are set and non-blank.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bucket) = get_env_override(BUCKET_ENV) {
            self.storage.bucket = Some(bucket);
        }
        if let Some(project) = get_env_override(PROJECT_ENV) {
            self.warehouse.project_id = Some(project);
        }
        self
    }

    /// Checks names that would otherwise only fail halfway through a run.
    pub fn validate(&self) -> anyhow::Result<()> {
        TableRef::parse(&self.warehouse.ratings_table).context("warehouse.ratings_table")?;
        TableRef::parse(&self.warehouse.sanity_view).context("warehouse.sanity_view")?;
        if let Some(ds) = self.warehouse.datasets.iter().find(|d| d.trim().is_empty()) {
            bail!("warehouse.datasets contains an empty name: {ds:?}");
        }
        if self.storage.source.trim().is_empty() {
            bail!("storage.source cannot be empty");
        }
        if self.storage.dataset_prefix.trim_matches('/').is_empty() {
            bail!("storage.dataset_prefix cannot be empty");
        }
        Ok(())
    }

    /// Project to bill and query in. Fails when neither the file nor
    /// `GCP_PROJECT_ID` names one.
    pub fn project_id(&self) -> anyhow::Result<&str> {
        self.warehouse
            .project_id
            .as_deref()
            .with_context(|| format!("warehouse.project_id is not set (or export {PROJECT_ENV})"))
    }
}

/// Parses TOML, applies environment overrides, and validates.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<PipelineConfig> {
    let cfg: PipelineConfig = toml::from_str(toml_str).context("failed to parse pipeline TOML")?;
    let cfg = cfg.with_env_overrides();
    cfg.validate().context("invalid pipeline config")?;
    Ok(cfg)
}

/// Reads a pipeline TOML file from disk. See [`load_config_str`].
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<PipelineConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read pipeline config {}", path.as_ref().display()))?;
    load_config_str(&text)
}
