//! Update-or-create refresh of the external table.
//!
//! The two calls are not atomic. A second refresh racing this one can turn
//! the fallback create into a duplicate-table error, so callers must run at
//! most one refresh per table at a time.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::catalog::{
    CatalogError, TableRef,
    definition::{ExternalTableDefinition, build_definition},
    listing::ArtifactLister,
};

/// Catalog service that stores external table definitions.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Replaces the definition of an existing table.
    async fn update_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError>;

    /// Creates the table. Fails if it already exists.
    async fn create_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError>;
}

/// Lists every artifact under `source_prefix` and builds the definition,
/// without touching the catalog.
pub async fn current_definition(
    lister: &dyn ArtifactLister,
    source_prefix: &str,
) -> Result<ExternalTableDefinition, CatalogError> {
    let uris = lister.list_artifacts(source_prefix).await?;
    let uri_prefix = lister.uri_prefix(source_prefix);
    debug!(uri_count = uris.len(), %uri_prefix, "building external table definition");
    build_definition(&uris, &uri_prefix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    Updated,
    Created,
}

#[derive(Debug, Clone)]
pub struct CatalogUpdateResult {
    pub table: TableRef,
    pub action: RefreshAction,
    pub definition: ExternalTableDefinition,
}

pub struct ExternalCatalogRefresher<'a> {
    lister: &'a dyn ArtifactLister,
    client: &'a dyn CatalogClient,
}

impl<'a> ExternalCatalogRefresher<'a> {
    pub fn new(lister: &'a dyn ArtifactLister, client: &'a dyn CatalogClient) -> Self {
        Self { lister, client }
    }

    /// Re-derives `catalog_name` from the full artifact history under
    /// `source_prefix`, updating the table in place or creating it.
    pub async fn refresh(
        &self,
        catalog_name: &str,
        source_prefix: &str,
    ) -> Result<CatalogUpdateResult, CatalogError> {
        let table = TableRef::parse(catalog_name)?;
        let definition = current_definition(self.lister, source_prefix).await?;

        let action = match self.client.update_external_table(&table, &definition).await {
            Ok(()) => RefreshAction::Updated,
            Err(update) => {
                debug!(%table, error = %update, "update failed, creating table");
                match self.client.create_external_table(&table, &definition).await {
                    Ok(()) => RefreshAction::Created,
                    Err(create) => {
                        warn!(%table, "external table update and create both failed");
                        return Err(CatalogError::UpdateAndCreateFailed {
                            table: table.to_string(),
                            update: Box::new(update),
                            create: Box::new(create),
                        });
                    }
                }
            }
        };

        info!(
            %table,
            ?action,
            uri_count = definition.source_uris.len(),
            "external table refreshed"
        );
        Ok(CatalogUpdateResult {
            table,
            action,
            definition,
        })
    }
}
