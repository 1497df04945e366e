#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bronze_catalog::{
    catalog::{
        CatalogError, TableRef, definition::ExternalTableDefinition, refresh::CatalogClient,
    },
    warehouse::{Row, Warehouse},
};
use places_ingestor::{
    models::place::{LookupOutcome, PlaceMatch},
    providers::{LookupError, PlaceLookup, UpstreamSnafu},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Raw request line, headers and body as received.
#[derive(Debug, Clone)]
pub struct Captured {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// One response per accepted connection, in order.
pub struct MockApi {
    pub base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockApi {
    pub async fn serve(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let (head_len, content_length) = loop {
                    let n = sock.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break (buf.len(), 0);
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                        let len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse().ok())
                            .unwrap_or(0);
                        break (pos + 4, len);
                    }
                };
                while buf.len() < head_len + content_length {
                    let n = sock.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let head = String::from_utf8_lossy(&buf[..head_len]).to_string();
                let mut lines = head.lines();
                let request_line = lines.next().unwrap_or_default().to_string();
                let headers = lines
                    .filter_map(|l| l.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
                let request_body = String::from_utf8_lossy(&buf[head_len..]).to_string();
                sink.lock().unwrap().push(Captured {
                    request_line,
                    headers,
                    body: request_body,
                });

                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}/bigquery/v2"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

/// In-memory catalog and warehouse.
#[derive(Default)]
pub struct FakeWarehouse {
    pub tables: Mutex<HashMap<String, ExternalTableDefinition>>,
    pub datasets: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<String>>,
    pub sanity_count: u64,
    pub catalog_down: bool,
}

impl FakeWarehouse {
    pub fn with_sanity_count(sanity_count: u64) -> Self {
        Self {
            sanity_count,
            ..Default::default()
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

fn api(status: u16, body: &str) -> CatalogError {
    CatalogError::Api {
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl CatalogClient for FakeWarehouse {
    async fn update_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError> {
        if self.catalog_down {
            return Err(api(503, "unavailable"));
        }
        match self.tables.lock().unwrap().get_mut(&table.to_string()) {
            Some(existing) => {
                *existing = definition.clone();
                Ok(())
            }
            None => Err(api(404, "not found")),
        }
    }

    async fn create_external_table(
        &self,
        table: &TableRef,
        definition: &ExternalTableDefinition,
    ) -> Result<(), CatalogError> {
        if self.catalog_down {
            return Err(api(503, "unavailable"));
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.contains_key(&table.to_string()) {
            return Err(api(409, "already exists"));
        }
        tables.insert(table.to_string(), definition.clone());
        Ok(())
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn ensure_dataset(&self, dataset: &str) -> Result<bool, CatalogError> {
        let mut datasets = self.datasets.lock().unwrap();
        if datasets.iter().any(|d| d == dataset) {
            return Ok(false);
        }
        datasets.push(dataset.to_string());
        Ok(true)
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CatalogError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(vec![vec![Some(self.sanity_count.to_string())]]);
        }
        Ok(Vec::new())
    }
}

/// Lookup answering by the first word of the query.
#[derive(Default)]
pub struct WordLookup {
    answers: HashMap<&'static str, Result<f64, u16>>,
    pub queries: Mutex<Vec<String>>,
}

impl WordLookup {
    pub fn rated(mut self, word: &'static str, rating: f64) -> Self {
        self.answers.insert(word, Ok(rating));
        self
    }

    pub fn failing(mut self, word: &'static str, status: u16) -> Self {
        self.answers.insert(word, Err(status));
        self
    }
}

#[async_trait]
impl PlaceLookup for WordLookup {
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, LookupError> {
        self.queries.lock().unwrap().push(query.to_string());
        let word = query.split(' ').next().unwrap_or_default();
        match self.answers.get(word) {
            Some(Ok(rating)) => Ok(LookupOutcome::Found(PlaceMatch {
                place_id: Some(format!("places/{word}")),
                rating: Some(*rating),
                review_count: Some(10),
                ..Default::default()
            })),
            Some(Err(status)) => UpstreamSnafu {
                status: *status,
                body: "rate limited",
            }
            .fail(),
            None => Ok(LookupOutcome::NotFound),
        }
    }
}
