//! Dated partition artifacts.
//!
//! A partition is addressed by `(source, run_date)`. Locally it lands at
//! `{root}/{run_date}/ratings.csv`; in durable storage it is mirrored under
//! hive-style segments, `{prefix}/source={source}/run_date={run_date}/ratings.csv`,
//! so the warehouse can infer the partition columns from the path.
//!
//! Writes are whole-file replacements: the same key always targets the same
//! path, and writing it twice leaves exactly the second payload.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::ResultExt;
use tracing::info;

use crate::{
    io::sink::{CreateDirSnafu, DataSink, EncodeSnafu, SinkError, WriteSnafu},
    models::enriched::{EnrichedRow, RATINGS_COLUMNS},
};

/// File name of a ratings partition.
pub const ARTIFACT_FILE_NAME: &str = "ratings.csv";

/// Identity of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub source: String,
    pub run_date: NaiveDate,
}

impl PartitionKey {
    pub fn new(source: impl Into<String>, run_date: NaiveDate) -> Self {
        Self {
            source: source.into(),
            run_date,
        }
    }

    /// `YYYY-MM-DD`.
    pub fn run_date_str(&self) -> String {
        self.run_date.format("%Y-%m-%d").to_string()
    }

    /// Local artifact path under `root`.
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(self.run_date_str()).join(ARTIFACT_FILE_NAME)
    }

    /// Durable-storage object key under `dataset_prefix`.
    pub fn object_key(&self, dataset_prefix: &str) -> String {
        let prefix = dataset_prefix.trim_matches('/');
        let tail = format!(
            "source={}/run_date={}/{ARTIFACT_FILE_NAME}",
            self.source,
            self.run_date_str()
        );
        if prefix.is_empty() {
            tail
        } else {
            format!("{prefix}/{tail}")
        }
    }
}

/// A materialized partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionArtifact {
    pub key: PartitionKey,
    pub path: PathBuf,
    pub row_count: usize,
}

/// Encodes rows as CSV with the fixed header, even when there are no rows.
///
/// Absent values become empty fields.
pub fn encode_rows(rows: &[EnrichedRow]) -> Result<Vec<u8>, SinkError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(RATINGS_COLUMNS).context(EncodeSnafu)?;
    for row in rows {
        wtr.serialize(row).context(EncodeSnafu)?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
        .context(EncodeSnafu)
}

/// Writes ratings partitions below a local root directory.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    root: PathBuf,
}

impl PartitionWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSink for PartitionWriter {
    type Output = PartitionArtifact;

    async fn write(&self, rows: &[EnrichedRow], key: &PartitionKey) -> Result<PartitionArtifact, SinkError> {
        let path = key.local_path(&self.root);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.context(CreateDirSnafu {
                path: dir.display().to_string(),
            })?;
        }

        let bytes = encode_rows(rows)?;
        tokio::fs::write(&path, &bytes).await.context(WriteSnafu {
            path: path.display().to_string(),
        })?;

        info!(path = %path.display(), rows = rows.len(), "wrote partition");
        Ok(PartitionArtifact {
            key: key.clone(),
            path,
            row_count: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enriched::RATING_SOURCE;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 19).unwrap()
    }

    fn row(id: &str, rating: Option<f64>, reviews: Option<u64>, place: Option<&str>) -> EnrichedRow {
        EnrichedRow {
            provider_id: id.to_string(),
            rating,
            reviews_count: reviews,
            rating_source: RATING_SOURCE.to_string(),
            places_id: place.map(str::to_string),
            fetched_at: date(),
        }
    }

    #[test]
    fn paths_depend_on_root_and_date_only() {
        let key = PartitionKey::new("google_places", date());
        assert_eq!(
            key.local_path(Path::new("data/bronze")),
            PathBuf::from("data/bronze/2025-09-19/ratings.csv")
        );
        assert_eq!(
            key.object_key("/bronze/ratings/"),
            "bronze/ratings/source=google_places/run_date=2025-09-19/ratings.csv"
        );
        assert_eq!(
            key.object_key(""),
            "source=google_places/run_date=2025-09-19/ratings.csv"
        );
    }

    #[test]
    fn absent_values_are_empty_fields() {
        let bytes = encode_rows(&[
            row("p1", Some(4.5), Some(120), Some("abc")),
            row("p2", None, None, None),
        ])
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "provider_id,rating,reviews_count,rating_source,places_id,fetched_at\n\
             p1,4.5,120,google_places_v1,abc,2025-09-19\n\
             p2,,,google_places_v1,,2025-09-19\n"
        );
        assert!(!text.contains("null"));
    }

    #[test]
    fn empty_row_set_still_has_header() {
        let text = String::from_utf8(encode_rows(&[]).unwrap()).unwrap();
        assert_eq!(
            text,
            "provider_id,rating,reviews_count,rating_source,places_id,fetched_at\n"
        );
    }

    #[tokio::test]
    async fn rewriting_a_partition_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PartitionWriter::new(dir.path().join("bronze"));
        let key = PartitionKey::new("google_places", date());

        let first = writer
            .write(&[row("p1", Some(4.0), Some(1), Some("a")), row("p2", None, None, None)], &key)
            .await
            .unwrap();
        let second = writer
            .write(&[row("p3", Some(2.0), Some(9), Some("c"))], &key)
            .await
            .unwrap();

        assert_eq!(first.path, second.path);
        let text = std::fs::read_to_string(&second.path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("p3"));
        assert!(!text.contains("p1"));
    }

    #[tokio::test]
    async fn same_rows_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PartitionWriter::new(dir.path());
        let key = PartitionKey::new("google_places", date());
        let rows = [row("p1", Some(4.5), Some(7), Some("a"))];

        let a = writer.write(&rows, &key).await.unwrap();
        let first = std::fs::read(&a.path).unwrap();
        // existing directory must not fail
        let b = writer.write(&rows, &key).await.unwrap();
        let second = std::fs::read(&b.path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the root directory should be
        let blocker = dir.path().join("bronze");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let writer = PartitionWriter::new(&blocker);
        let err = writer
            .write(&[], &PartitionKey::new("google_places", date()))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::CreateDir { .. }));
    }
}
