#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use places_ingestor::{
    models::place::{LookupOutcome, PlaceMatch},
    providers::{LookupError, PlaceLookup, UpstreamSnafu},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// A request as seen by [`CannedServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }
}

pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Serves one canned response per connection, in order, on 127.0.0.1.
pub struct CannedServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl CannedServer {
    pub async fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = requests.clone();

        tokio::spawn(async move {
            for resp in responses {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let req = read_request(&mut sock).await;
                captured.lock().unwrap().push(req);
                if let Some(delay) = resp.delay {
                    tokio::time::sleep(delay).await;
                }
                let reason = if resp.status < 400 { "OK" } else { "Error" };
                let payload = format!(
                    "HTTP/1.1 {} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    resp.status,
                    resp.body.len(),
                    resp.body
                );
                let _ = sock.write_all(payload.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });

        Self {
            url: format!("http://{addr}/v1/places:searchText"),
            requests,
        }
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(sock: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = sock.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| v.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = sock.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
    CapturedRequest { head, body }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Scripted lookup keyed by the first word of the query.
#[derive(Default)]
pub struct FakeLookup {
    answers: Mutex<std::collections::HashMap<String, VecDeque<Answer>>>,
    pub calls: Mutex<Vec<String>>,
}

#[derive(Clone, Copy)]
pub enum Answer {
    Place(&'static str, Option<f64>, Option<u64>),
    Nothing,
    Fail(u16),
}

impl FakeLookup {
    pub fn answer(self, first_word: &str, answer: Answer) -> Self {
        self.answers
            .lock()
            .unwrap()
            .entry(first_word.to_string())
            .or_default()
            .push_back(answer);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PlaceLookup for FakeLookup {
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, LookupError> {
        self.calls.lock().unwrap().push(query.to_string());
        let key = query.split(' ').next().unwrap_or_default().to_string();
        let answer = self
            .answers
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Answer::Nothing);
        match answer {
            Answer::Place(id, rating, reviews) => Ok(LookupOutcome::Found(PlaceMatch {
                place_id: Some(id.to_string()),
                rating,
                review_count: reviews,
                ..Default::default()
            })),
            Answer::Nothing => Ok(LookupOutcome::NotFound),
            Answer::Fail(status) => UpstreamSnafu {
                status,
                body: "upstream exploded",
            }
            .fail(),
        }
    }
}
