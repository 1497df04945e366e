//! Warehouse operations the pipeline needs beyond the external table.

use async_trait::async_trait;

use crate::catalog::{CatalogError, TableRef};

/// One result row; `None` is SQL `NULL`.
pub type Row = Vec<Option<String>>;

#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Creates `dataset` unless it already exists. Returns `true` if created.
    async fn ensure_dataset(&self, dataset: &str) -> Result<bool, CatalogError>;

    /// Runs one standard-SQL statement and returns its rows.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CatalogError>;

    /// `SELECT COUNT(*)` over a table or view.
    async fn count_rows(&self, relation: &str) -> Result<u64, CatalogError> {
        let relation = TableRef::parse(relation)?;
        let rows = self
            .execute(&format!("SELECT COUNT(*) FROM `{relation}`"))
            .await?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(|cell| cell.as_deref())
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                CatalogError::UnexpectedResponse(format!("COUNT(*) on {relation} returned {rows:?}"))
            })
    }
}
