//! BigQuery REST client.
//!
//! Covers just what the bronze layer touches: external table update/insert,
//! dataset insert, and synchronous queries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    catalog::{CatalogError, TableRef, definition::ExternalTableDefinition, refresh::CatalogClient},
    warehouse::{Row, Warehouse},
};

pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const QUERY_TIMEOUT_MS: u64 = 60_000;

pub struct BigQueryClient {
    http: Client,
    base_url: String,
    project_id: String,
    access_token: SecretString,
}

impl BigQueryClient {
    pub fn new(
        project_id: impl Into<String>,
        access_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            access_token,
        })
    }

    /// Points the client at another endpoint (emulators, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}",
            self.base_url,
            table.project_or(&self.project_id),
            table.dataset,
            table.table
        )
    }

    /// Sends the request; any non-2xx status becomes [`CatalogError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), CatalogError> {
        let response = request
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok((status.as_u16(), body))
    }
}

#[async_trait]
impl CatalogClient for BigQueryClient {
    async fn update_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError> {
        let body = json!({ "externalDataConfiguration": definition });
        self.send(self.http.patch(self.table_url(table)).json(&body))
            .await?;
        Ok(())
    }

    async fn create_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError> {
        let project = table.project_or(&self.project_id);
        let url = format!(
            "{}/projects/{project}/datasets/{}/tables",
            self.base_url, table.dataset
        );
        let body = json!({
            "tableReference": {
                "projectId": project,
                "datasetId": table.dataset,
                "tableId": table.table,
            },
            "externalDataConfiguration": definition,
        });
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    rows: Vec<QueryRow>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    f: Vec<QueryCell>,
}

#[derive(Debug, Deserialize)]
struct QueryCell {
    v: Value,
}

impl QueryCell {
    fn into_text(self) -> Option<String> {
        match self.v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn ensure_dataset(&self, dataset: &str) -> Result<bool, CatalogError> {
        let url = format!("{}/projects/{}/datasets", self.base_url, self.project_id);
        let body = json!({
            "datasetReference": { "projectId": self.project_id, "datasetId": dataset },
        });
        match self.send(self.http.post(url).json(&body)).await {
            Ok(_) => {
                info!(dataset, "created dataset");
                Ok(true)
            }
            Err(CatalogError::Api { status: 409, .. }) => {
                debug!(dataset, "dataset already exists");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CatalogError> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.project_id);
        let body = json!({
            "query": sql,
            "useLegacySql": false,
            "timeoutMs": QUERY_TIMEOUT_MS,
        });
        let (_, text) = self.send(self.http.post(url).json(&body)).await?;
        let response: QueryResponse = serde_json::from_str(&text)
            .map_err(|e| CatalogError::UnexpectedResponse(format!("query response: {e}")))?;
        if !response.job_complete {
            return Err(CatalogError::UnexpectedResponse(format!(
                "query did not finish within {QUERY_TIMEOUT_MS} ms"
            )));
        }
        Ok(response
            .rows
            .into_iter()
            .map(|row| row.f.into_iter().map(QueryCell::into_text).collect())
            .collect())
    }
}
