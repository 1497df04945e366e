use thiserror::Error;

use crate::{
    io::sink::SinkError,
    models::provider::ProviderFileError,
    providers::{LookupError, ProviderInitError},
};

/// The unified error type for the `places_ingestor` crate.
///
/// Everything here is fatal for a run. Per-provider lookup failures inside a
/// batch never reach this type; see [`crate::enrich::SkipReason`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The lookup client could not be built (missing credential, bad header value, ...).
    #[error("Provider initialization error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// The provider input file could not be read.
    #[error("Provider input error: {0}")]
    Input(#[from] ProviderFileError),

    /// Writing or mirroring an artifact failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A one-off lookup from the command line failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),
}
