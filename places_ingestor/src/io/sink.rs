use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::{io::partition::PartitionKey, models::enriched::EnrichedRow};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The destination directory could not be created.
    #[snafu(display("Failed to create directory {path}: {source}"))]
    CreateDir {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Rows could not be encoded into the artifact format.
    #[snafu(display("Failed to encode rows: {source}"))]
    Encode {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// The encoded artifact could not be written (disk full, permissions, ...).
    #[snafu(display("Failed to write {path}: {source}"))]
    Write {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A written artifact could not be read back for upload.
    #[snafu(display("Failed to read {path}: {source}"))]
    Read {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Durable storage rejected the upload.
    #[snafu(display("Failed to upload {location}: {source}"))]
    Upload {
        location: String,
        source: object_store::Error,
        backtrace: Backtrace,
    },
}

/// Destination for one partition worth of rows.
#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the artifact it wrote; other sinks might return a
    /// row count or an object location.
    type Output;

    /// Writes `rows` as the partition identified by `key`, replacing any
    /// previous contents of that partition.
    async fn write(&self, rows: &[EnrichedRow], key: &PartitionKey) -> Result<Self::Output, SinkError>;
}
