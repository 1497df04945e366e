use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bronze_catalog::{
    catalog::{
        bigquery::BigQueryClient, listing::ObjectStoreLister,
        refresh::{ExternalCatalogRefresher, current_definition},
    },
    config::{PipelineConfig, load_config_path},
    pipeline::{Credentials, PipelineDeps, run_pipeline},
    storage::open_store,
};
use clap::{Parser, Subcommand};
use places_ingestor::{
    cli::params::parse_run_date, io::partition::ARTIFACT_FILE_NAME,
    providers::google_places::GooglePlacesProvider,
};
use secrecy::SecretString;
use shared_utils::env::get_required_env_var;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Bronze ratings sync")]
struct Cli {
    /// Pipeline TOML. Defaults (plus GCS_BUCKET / GCP_PROJECT_ID) apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch ratings for one run date and rebuild everything downstream
    Run {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        run_date: Option<String>,
    },
    /// Rebuild the external table from whatever partitions are in storage
    Refresh {
        /// Print the definition without touching the warehouse
        #[arg(long)]
        dry_run: bool,
        /// Also write the definition JSON here
        #[arg(long, value_name = "FILE")]
        definition_out: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => {
            let cfg = PipelineConfig::default().with_env_overrides();
            cfg.validate()?;
            cfg
        }
    };

    match cli.cmd {
        Cmd::Run { run_date } => {
            let run_date = parse_run_date(run_date.as_deref()).context("invalid --run-date")?;

            // Credentials first: nothing is created, written, or sent without them.
            let creds = Credentials::resolve(&config)?;
            let warehouse = warehouse_client(&config, creds.warehouse_token)?;
            let provider = GooglePlacesProvider::new(&config.places, creds.places_api_key)
                .context("build places client")?;
            let opened = open_store(&config.storage)?;

            let deps = PipelineDeps {
                lookup: &provider,
                store: opened.store,
                uri_root: opened.uri_root,
                catalog: &warehouse,
                warehouse: &warehouse,
            };
            let outcome = run_pipeline(&config, run_date, &deps).await?;
            println!(
                "Wrote {} ({} rows, {} skipped); {} now spans {} partitions; {} has {} rows",
                outcome.uploaded,
                outcome.run.artifact.row_count,
                outcome.run.report.skipped.len(),
                outcome.catalog.table,
                outcome.catalog.definition.source_uris.len(),
                config.warehouse.sanity_view,
                outcome.sanity_rows,
            );
        }
        Cmd::Refresh {
            dry_run,
            definition_out,
        } => {
            let token = if dry_run {
                None
            } else {
                Some(
                    get_required_env_var(&config.warehouse.access_token_env)
                        .context("warehouse access token is required")?,
                )
            };
            let opened = open_store(&config.storage)?;
            let lister = ObjectStoreLister::new(opened.store, opened.uri_root, ARTIFACT_FILE_NAME);

            let definition = match token {
                None => current_definition(&lister, &config.storage.dataset_prefix).await?,
                Some(token) => {
                    let client = warehouse_client(&config, SecretString::from(token))?;
                    let result = ExternalCatalogRefresher::new(&lister, &client)
                        .refresh(&config.warehouse.ratings_table, &config.storage.dataset_prefix)
                        .await?;
                    println!("{:?} {}", result.action, result.table);
                    result.definition
                }
            };

            let json = definition.to_json_pretty()?;
            match definition_out {
                Some(path) => std::fs::write(&path, &json)
                    .with_context(|| format!("write {}", path.display()))?,
                None if dry_run => println!("{json}"),
                None => {}
            }
        }
    }

    Ok(())
}

fn warehouse_client(config: &PipelineConfig, token: SecretString) -> Result<BigQueryClient> {
    let project = config.project_id()?;
    BigQueryClient::new(
        project,
        token,
        Duration::from_secs(config.warehouse.timeout_secs),
    )
    .context("build warehouse client")
}
