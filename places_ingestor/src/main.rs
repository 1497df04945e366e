use clap::Parser;
use places_ingestor::{
    cli::{
        commands::{Cli, Commands},
        params::parse_run_date,
    },
    config::{IngestorConfig, read_config},
    errors::Error,
    io::partition::{PartitionKey, PartitionWriter},
    models::place::LookupOutcome,
    providers::{PlaceLookup, google_places::GooglePlacesProvider},
    ratings::{DEFAULT_SOURCE, fetch_ratings},
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => IngestorConfig::default(),
    };

    // Credentials first: nothing is read, written, or sent without them.
    let provider = GooglePlacesProvider::from_env(&config.places)?;

    match cli.command {
        Commands::Fetch {
            providers,
            out_dir,
            run_date,
        } => {
            let run_date = parse_run_date(run_date.as_deref())
                .map_err(|e| Error::Config(format!("invalid --run-date: {e}")))?;
            let writer = PartitionWriter::new(out_dir);
            let key = PartitionKey::new(DEFAULT_SOURCE, run_date);
            let run = fetch_ratings(&provider, &config, &providers, &writer, &key).await?;
            println!("Wrote {}", run.artifact.path.display());
        }
        Commands::Lookup { query } => match provider.lookup(query.trim()).await? {
            LookupOutcome::Found(m) => {
                println!(
                    "{}\t{}\t{}\t{}",
                    m.place_id.unwrap_or_default(),
                    m.display_name.unwrap_or_default(),
                    m.rating.map(|r| r.to_string()).unwrap_or_default(),
                    m.review_count.map(|c| c.to_string()).unwrap_or_default(),
                );
            }
            LookupOutcome::NotFound => {
                println!("No place for {query}");
            }
        },
    }

    Ok(())
}
