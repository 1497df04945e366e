use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (places_ingestor.toml). Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up every provider in a CSV file and write the ratings partition
    Fetch {
        /// Provider CSV (provider_id,display_name,category,website,phone[,city])
        #[arg(long)]
        providers: PathBuf,

        /// Root directory; the artifact lands at <out-dir>/<run-date>/ratings.csv
        #[arg(long)]
        out_dir: PathBuf,

        /// Logical run date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        run_date: Option<String>,
    },

    /// Run a single free-text search and print the best match
    Lookup {
        /// Free-text query (e.g. "Revival PT Minneapolis MN")
        #[arg(long)]
        query: String,
    },
}
