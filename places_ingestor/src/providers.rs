//! Place lookup abstraction.
//!
//! This module defines the [`PlaceLookup`] trait, the seam between the
//! enrichment runner and any places search backend. The production
//! implementation is [`google_places::provider::GooglePlacesProvider`]; tests
//! substitute scripted fakes.
//!
//! A lookup has three distinct results:
//!
//! * `Ok(LookupOutcome::Found(..))` - the first, API-ranked candidate.
//! * `Ok(LookupOutcome::NotFound)` - the search succeeded with no candidates.
//! * `Err(LookupError)` - the search itself failed. The caller owns the
//!   retry/skip decision; implementations never swallow failures.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use places_ingestor::models::place::LookupOutcome;
//! use places_ingestor::providers::{LookupError, PlaceLookup};
//!
//! struct NeverFound;
//!
//! #[async_trait]
//! impl PlaceLookup for NeverFound {
//!     async fn lookup(&self, _query: &str) -> Result<LookupOutcome, LookupError> {
//!         Ok(LookupOutcome::NotFound)
//!     }
//! }
//! ```

pub mod google_places;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::place::LookupOutcome;

/// Free-text place search.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Searches for `query` and returns the best match, if any.
    ///
    /// # Arguments
    ///
    /// * `query` - Trimmed free-text query, e.g. `"Revival PT Minneapolis MN"`.
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, LookupError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing credential: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A configured header value (API key, field mask) contains invalid characters.
    #[snafu(display("Invalid value for header {name}: {source}"))]
    InvalidHeader {
        name: &'static str,
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a [`PlaceLookup`] call.
///
/// All variants are per-query failures. The runner isolates them to the
/// provider that triggered them.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LookupError {
    /// The API answered with a non-success status.
    #[snafu(display("Upstream returned HTTP {status}: {body}"))]
    Upstream {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The request never produced a response (connect failure, timeout, reset).
    #[snafu(display("API request failed: {source}"))]
    Transport {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A success response whose body could not be decoded.
    #[snafu(display("Malformed API response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

impl LookupError {
    /// Whether a retry could plausibly succeed: throttling, server errors,
    /// and transport failures. Client errors and decode failures are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::Transport { .. } => true,
            Self::Decode { .. } => false,
        }
    }

    /// HTTP status of an upstream rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
