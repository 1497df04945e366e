use thiserror::Error;

/// Errors raised while listing artifacts or maintaining the external table.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Nothing to declare: the prefix holds no partition artifacts.
    #[error("no partition artifacts found under {prefix}")]
    NoArtifacts { prefix: String },

    /// An artifact URI does not fit the `prefix/key=value/.../file` layout.
    #[error("malformed artifact URI {uri}: {reason}")]
    MalformedUri { uri: String, reason: String },

    /// Two artifacts disagree on their partition columns.
    #[error("artifact {uri} has partition keys {found:?}, expected {expected:?}")]
    InconsistentPartitions {
        uri: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A catalog name that is not `dataset.table` or `project.dataset.table`.
    #[error("invalid table name: {0}")]
    InvalidTableName(String),

    /// Listing the storage prefix failed.
    #[error("failed to list artifacts: {0}")]
    Listing(#[from] object_store::Error),

    /// The catalog service could not be reached.
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog service rejected a call.
    #[error("catalog API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A response that does not have the expected shape.
    #[error("unexpected catalog response: {0}")]
    UnexpectedResponse(String),

    /// Both halves of update-or-create failed.
    #[error("updating {table} failed ({update}); creating it failed too ({create})")]
    UpdateAndCreateFailed {
        table: String,
        update: Box<CatalogError>,
        create: Box<CatalogError>,
    },
}
