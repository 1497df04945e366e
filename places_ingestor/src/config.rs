//! Ingestor configuration.
//!
//! All settings live in one explicit [`IngestorConfig`] that is handed to the
//! lookup client and the runner at construction. Nothing here reads process
//! state except [`PlacesConfig::api_key`], which resolves the credential once.
//!
//! Every field has a default, so an empty TOML file (or no file at all) yields
//! the default Minneapolis setup:
//!
//! ```toml
//! [places]
//! timeout_secs = 20
//!
//! [places.bias]
//! latitude = 44.9778
//! longitude = -93.2650
//! radius_m = 50000.0
//!
//! [query]
//! region_code = "MN"
//! default_city = "Minnesota"
//! ```

use std::{num::NonZeroU32, path::Path, time::Duration};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shared_utils::env::{MissingEnvVarError, get_required_env_var};

use crate::errors::Error;

pub const DEFAULT_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";
pub const DEFAULT_FIELD_MASK: &str =
    "places.id,places.displayName,places.rating,places.userRatingCount,places.location";
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Top-level configuration for a ratings run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IngestorConfig {
    pub places: PlacesConfig,
    pub query: QueryConfig,
    pub retry: RetryConfig,
}

/// Settings for the places search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PlacesConfig {
    pub endpoint: String,
    /// Response field selection sent with every request.
    pub field_mask: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Client-side throttle. Unset means requests go out as fast as they complete.
    pub requests_per_second: Option<NonZeroU32>,
    pub bias: LocationBias,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_mask: DEFAULT_FIELD_MASK.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 20,
            requests_per_second: None,
            bias: LocationBias::default(),
        }
    }
}

impl PlacesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolves the API key from the configured environment variable.
    ///
    /// Blank values count as missing.
    pub fn api_key(&self) -> Result<SecretString, MissingEnvVarError> {
        get_required_env_var(&self.api_key_env).map(SecretString::from)
    }
}

/// Circular search bias: results near the center rank higher, nothing is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationBias {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters.
    pub radius_m: f64,
}

impl Default for LocationBias {
    // downtown Minneapolis, 50 km
    fn default() -> Self {
        Self {
            latitude: 44.9778,
            longitude: -93.2650,
            radius_m: 50_000.0,
        }
    }
}

/// How the free-text query is assembled from a provider record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct QueryConfig {
    /// Appended to every query, e.g. a state code.
    pub region_code: String,
    /// Used when a provider has no city.
    pub default_city: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            region_code: "MN".to_string(),
            default_city: "Minnesota".to_string(),
        }
    }
}

/// Per-provider retry policy. The default makes a single attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Parses an [`IngestorConfig`] from TOML text.
pub fn parse_config(text: &str) -> Result<IngestorConfig, Error> {
    toml::from_str(text).map_err(|e| Error::Config(format!("invalid config: {e}")))
}

/// Reads and parses an [`IngestorConfig`] from a TOML file.
pub fn read_config(path: impl AsRef<Path>) -> Result<IngestorConfig, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_config(&text)
}
