//! Object store selection for the bronze mirror.

use std::sync::Arc;

use anyhow::Context;
use object_store::{ObjectStore, gcp::GoogleCloudStorageBuilder, local::LocalFileSystem};

use crate::config::{BUCKET_ENV, StorageConfig};

/// An object store plus the URI root its keys are published under.
#[derive(Clone)]
pub struct ArtifactStore {
    pub store: Arc<dyn ObjectStore>,
    /// e.g. `gs://my-bucket` or `file:///srv/mirror`
    pub uri_root: String,
}

/// Opens the configured store: a local directory when `mirror_root` is set,
/// otherwise the GCS bucket. GCS credentials come from the usual
/// `GOOGLE_*` environment variables.
pub fn open_store(config: &StorageConfig) -> anyhow::Result<ArtifactStore> {
    if let Some(root) = &config.mirror_root {
        std::fs::create_dir_all(root)
            .with_context(|| format!("create mirror root {}", root.display()))?;
        let root = root
            .canonicalize()
            .with_context(|| format!("resolve mirror root {}", root.display()))?;
        let store = LocalFileSystem::new_with_prefix(&root)
            .with_context(|| format!("open local mirror {}", root.display()))?;
        return Ok(ArtifactStore {
            store: Arc::new(store),
            uri_root: format!("file://{}", root.display()),
        });
    }

    let bucket = config
        .bucket
        .as_deref()
        .with_context(|| format!("storage.bucket is not set (or export {BUCKET_ENV})"))?;
    let store = GoogleCloudStorageBuilder::from_env()
        .with_bucket_name(bucket)
        .build()
        .with_context(|| format!("open bucket {bucket}"))?;
    Ok(ArtifactStore {
        store: Arc::new(store),
        uri_root: format!("gs://{bucket}"),
    })
}
