//! Partition artifact enumeration.
//!
//! Artifacts live at `{prefix}/key=value/.../{file_name}`. Listing returns full
//! URIs (e.g. `gs://bucket/bronze/ratings/source=x/run_date=2025-01-01/ratings.csv`)
//! for every run date currently in storage, sorted.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use indexmap::IndexMap;
use object_store::{ObjectMeta, ObjectStore, path::Path as ObjectPath};
use tracing::debug;

use crate::catalog::CatalogError;

/// Source of partition artifact URIs.
#[async_trait]
pub trait ArtifactLister: Send + Sync {
    /// Every artifact URI currently under `source_prefix`, across all runs.
    async fn list_artifacts(&self, source_prefix: &str) -> Result<Vec<String>, CatalogError>;

    /// URI prefix that partition paths are relative to, with a trailing `/`.
    fn uri_prefix(&self, source_prefix: &str) -> String;
}

/// Joins a URI root and a prefix as `{root}/{prefix}/`.
pub fn join_uri_prefix(uri_root: &str, source_prefix: &str) -> String {
    let root = uri_root.trim_end_matches('/');
    let prefix = source_prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{root}/")
    } else {
        format!("{root}/{prefix}/")
    }
}

/// Splits one `key=value` path segment.
fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let (k, v) = segment.split_once('=')?;
    (!k.is_empty() && !v.is_empty()).then_some((k, v))
}

/// Whether `relative_path` (relative to the dataset prefix) names a partition
/// artifact: one or more `key=value` directories followed by `file_name`.
pub fn is_partition_artifact(relative_path: &str, file_name: &str) -> bool {
    let mut segments: Vec<&str> = relative_path.split('/').collect();
    let Some(last) = segments.pop() else {
        return false;
    };
    last == file_name
        && !segments.is_empty()
        && segments.iter().all(|s| split_segment(s).is_some())
}

/// Extracts the ordered partition columns of an artifact URI.
pub fn parse_partition_segments(
    uri: &str,
    uri_prefix: &str,
) -> Result<IndexMap<String, String>, CatalogError> {
    let malformed = |reason: &str| CatalogError::MalformedUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };
    let relative = uri
        .strip_prefix(uri_prefix)
        .ok_or_else(|| malformed("not under the source URI prefix"))?;

    let mut segments: Vec<&str> = relative.split('/').collect();
    match segments.pop() {
        Some(file) if !file.is_empty() && !file.contains('=') => {}
        _ => return Err(malformed("missing file name")),
    }
    if segments.is_empty() {
        return Err(malformed("no partition segments"));
    }

    let mut partitions = IndexMap::new();
    for segment in segments {
        let (k, v) = split_segment(segment)
            .ok_or_else(|| malformed(&format!("segment '{segment}' is not key=value")))?;
        if partitions.insert(k.to_string(), v.to_string()).is_some() {
            return Err(malformed(&format!("partition key '{k}' repeats")));
        }
    }
    Ok(partitions)
}

/// Lists artifacts from an [`ObjectStore`].
pub struct ObjectStoreLister {
    store: Arc<dyn ObjectStore>,
    uri_root: String,
    file_name: String,
}

impl ObjectStoreLister {
    /// `uri_root` is what object keys are appended to, e.g. `gs://my-bucket`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        uri_root: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            uri_root: uri_root.into(),
            file_name: file_name.into(),
        }
    }
}

#[async_trait]
impl ArtifactLister for ObjectStoreLister {
    async fn list_artifacts(&self, source_prefix: &str) -> Result<Vec<String>, CatalogError> {
        let prefix = source_prefix.trim_matches('/');
        let prefix_path = ObjectPath::from(prefix);
        let objects: Vec<ObjectMeta> = self.store.list(Some(&prefix_path)).try_collect().await?;

        let mut uris: Vec<String> = objects
            .iter()
            .filter_map(|meta| {
                let key = meta.location.as_ref();
                let relative = key.strip_prefix(prefix)?.trim_start_matches('/');
                is_partition_artifact(relative, &self.file_name)
                    .then(|| format!("{}/{key}", self.uri_root.trim_end_matches('/')))
            })
            .collect();
        uris.sort();

        debug!(prefix, listed = objects.len(), artifacts = uris.len(), "listed artifacts");
        Ok(uris)
    }

    fn uri_prefix(&self, source_prefix: &str) -> String {
        join_uri_prefix(&self.uri_root, source_prefix)
    }
}
