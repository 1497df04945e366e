//! External table definition document.
//!
//! [`build_definition`] is pure: the same set of URIs always yields the same
//! document, whatever order storage listed them in.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{CatalogError, listing::parse_partition_segments};

/// Source format of every partition artifact.
pub const SOURCE_FORMAT: &str = "CSV";
/// Leading rows skipped in each artifact (the header).
pub const SKIP_LEADING_ROWS: u32 = 1;
/// Partition columns are typed as strings.
pub const HIVE_PARTITIONING_MODE: &str = "STRINGS";

/// `externalDataConfiguration` payload for the external table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTableDefinition {
    pub source_format: String,
    pub autodetect: bool,
    pub csv_options: CsvOptions,
    pub hive_partitioning_options: HivePartitioningOptions,
    pub source_uris: Vec<String>,
    /// Partition columns inferred from the paths, in path order.
    #[serde(skip)]
    pub partition_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvOptions {
    pub skip_leading_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HivePartitioningOptions {
    pub mode: String,
    pub source_uri_prefix: String,
}

impl ExternalTableDefinition {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds the definition over every artifact in `uris`.
///
/// URIs are de-duplicated and sorted. Every URI must sit under `uri_prefix`
/// and carry the same partition keys in the same order.
///
/// # Errors
/// - [`CatalogError::NoArtifacts`] when `uris` is empty
/// - [`CatalogError::MalformedUri`] for a URI outside the hive layout
/// - [`CatalogError::InconsistentPartitions`] when partition keys disagree
pub fn build_definition<I, S>(
    uris: I,
    uri_prefix: &str,
) -> Result<ExternalTableDefinition, CatalogError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let source_uris: BTreeSet<String> = uris.into_iter().map(|u| u.as_ref().to_string()).collect();
    if source_uris.is_empty() {
        return Err(CatalogError::NoArtifacts {
            prefix: uri_prefix.to_string(),
        });
    }

    let mut partition_keys: Option<Vec<String>> = None;
    for uri in &source_uris {
        let found: Vec<String> = parse_partition_segments(uri, uri_prefix)?
            .into_keys()
            .collect();
        match &partition_keys {
            None => partition_keys = Some(found),
            Some(expected) if *expected != found => {
                return Err(CatalogError::InconsistentPartitions {
                    uri: uri.clone(),
                    expected: expected.clone(),
                    found,
                });
            }
            Some(_) => {}
        }
    }

    Ok(ExternalTableDefinition {
        source_format: SOURCE_FORMAT.to_string(),
        autodetect: true,
        csv_options: CsvOptions {
            skip_leading_rows: SKIP_LEADING_ROWS,
        },
        hive_partitioning_options: HivePartitioningOptions {
            mode: HIVE_PARTITIONING_MODE.to_string(),
            source_uri_prefix: uri_prefix.to_string(),
        },
        source_uris: source_uris.into_iter().collect(),
        partition_keys: partition_keys.unwrap_or_default(),
    })
}
