//! Upload of local partition artifacts to durable storage.

use std::sync::Arc;

use object_store::{ObjectStore, PutPayload, path::Path as ObjectPath};
use snafu::ResultExt;
use tracing::info;

use crate::io::{
    partition::PartitionArtifact,
    sink::{ReadSnafu, SinkError, UploadSnafu},
};

/// Copies partition artifacts into an object store under hive-style keys.
///
/// Uploading the same partition again overwrites the previous object.
#[derive(Clone)]
pub struct ArtifactMirror {
    store: Arc<dyn ObjectStore>,
    dataset_prefix: String,
}

impl ArtifactMirror {
    pub fn new(store: Arc<dyn ObjectStore>, dataset_prefix: impl Into<String>) -> Self {
        Self {
            store,
            dataset_prefix: dataset_prefix.into(),
        }
    }

    /// Object location for an artifact.
    pub fn location(&self, artifact: &PartitionArtifact) -> ObjectPath {
        ObjectPath::from(artifact.key.object_key(&self.dataset_prefix))
    }

    /// Uploads the artifact's current file contents.
    pub async fn upload(&self, artifact: &PartitionArtifact) -> Result<ObjectPath, SinkError> {
        let bytes = tokio::fs::read(&artifact.path).await.context(ReadSnafu {
            path: artifact.path.display().to_string(),
        })?;
        let location = self.location(artifact);
        self.store
            .put(&location, PutPayload::from(bytes))
            .await
            .context(UploadSnafu {
                location: location.to_string(),
            })?;
        info!(%location, "mirrored partition");
        Ok(location)
    }
}
