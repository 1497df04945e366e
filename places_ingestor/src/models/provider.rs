//! Input provider records.
//!
//! A provider file is a headered CSV with at least `provider_id` and
//! `display_name`. `category`, `website`, and `phone` are carried through for
//! the wider pipeline; an optional `city` column narrows the place search.

use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tracing::warn;

/// One service provider to enrich.
///
/// Records are read once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Externally assigned identity key, unique within a provider file.
    pub provider_id: String,
    /// Human-readable name used as the main search term.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// City hint for the search. Blank or absent falls back to the configured region.
    #[serde(default)]
    pub city: Option<String>,
}

impl ProviderRecord {
    /// Convenience constructor for the two fields the lookup needs.
    pub fn new(provider_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            display_name: display_name.into(),
            category: None,
            website: None,
            phone: None,
            city: None,
        }
    }

    /// Sets the city hint.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// The city to search in, or `fallback` when the record has none.
    pub fn city_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(fallback)
    }
}

/// Errors raised while reading a provider file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderFileError {
    /// The file could not be opened.
    #[snafu(display("Failed to open provider file {path}: {source}"))]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// The header row is missing or unreadable.
    #[snafu(display("Unreadable provider header: {source}"))]
    Header { source: csv::Error },

    /// The underlying reader failed mid-file.
    #[snafu(display("Failed to read provider rows: {source}"))]
    Read { source: csv::Error },
}

/// Reads every provider record from a headered CSV file.
pub fn read_providers(path: impl AsRef<Path>) -> Result<Vec<ProviderRecord>, ProviderFileError> {
    let path = path.as_ref();
    let file = File::open(path).context(OpenSnafu {
        path: path.display().to_string(),
    })?;
    read_providers_from(file)
}

/// Reads provider records from any reader. Rows keep file order.
///
/// Short or long rows are accepted; absent trailing columns read as empty.
/// A row that still cannot be decoded, or that has no `provider_id`, is
/// logged and skipped. Only an unreadable header or an I/O failure is an error.
pub fn read_providers_from<R: Read>(reader: R) -> Result<Vec<ProviderRecord>, ProviderFileError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context(HeaderSnafu)?.clone();

    let mut providers = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) if e.is_io_error() => return Err(e).context(ReadSnafu),
            Err(e) => {
                let line = e.position().map(csv::Position::line);
                warn!(?line, error = %e, "skipping unreadable provider row");
                continue;
            }
        }

        let line = record.position().map(csv::Position::line);
        match record.deserialize::<ProviderRecord>(Some(&headers)) {
            Ok(p) if p.provider_id.trim().is_empty() => {
                warn!(?line, "skipping provider row without provider_id");
            }
            Ok(p) => providers.push(p),
            Err(e) => warn!(?line, error = %e, "skipping malformed provider row"),
        }
    }
    Ok(providers)
}
