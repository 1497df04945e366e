use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    config::{LocationBias, PlacesConfig},
    models::place::LookupOutcome,
    providers::{
        ClientBuildSnafu, DecodeSnafu, InvalidHeaderSnafu, LookupError, MissingEnvVarSnafu,
        PlaceLookup, ProviderInitError, TransportSnafu, UpstreamSnafu,
        google_places::{request::SearchTextRequest, response::SearchTextResponse},
    },
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const FIELD_MASK_HEADER: &str = "x-goog-fieldmask";

/// `places:searchText` client with a fixed location bias.
///
/// Each call is one POST; there is no local caching. When
/// `requests_per_second` is configured, calls wait for a rate-limiter permit
/// before going out.
pub struct GooglePlacesProvider {
    client: Client,
    endpoint: String,
    bias: LocationBias,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl GooglePlacesProvider {
    /// Creates a new provider from explicit configuration and credential.
    pub fn new(config: &PlacesConfig, api_key: SecretString) -> Result<Self, ProviderInitError> {
        let mut key_value = header::HeaderValue::from_str(api_key.expose_secret())
            .context(InvalidHeaderSnafu {
                name: API_KEY_HEADER,
            })?;
        key_value.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(
            FIELD_MASK_HEADER,
            header::HeaderValue::from_str(&config.field_mask).context(InvalidHeaderSnafu {
                name: FIELD_MASK_HEADER,
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;

        let limiter = config
            .requests_per_second
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            bias: config.bias,
            limiter,
        })
    }

    /// Creates a new provider, reading the API key from the environment
    /// variable named by `config.api_key_env`.
    pub fn from_env(config: &PlacesConfig) -> Result<Self, ProviderInitError> {
        let api_key = config.api_key().context(MissingEnvVarSnafu)?;
        Self::new(config, api_key)
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesProvider {
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, LookupError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let body = SearchTextRequest::new(query, &self.bias);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context(TransportSnafu)?;

        let status = response.status();
        let text = response.text().await.context(TransportSnafu)?;

        if !status.is_success() {
            return UpstreamSnafu {
                status: status.as_u16(),
                body: text,
            }
            .fail();
        }

        debug!(query, bytes = text.len(), "places search ok");
        if text.trim().is_empty() {
            return Ok(LookupOutcome::NotFound);
        }
        let parsed: SearchTextResponse = serde_json::from_str(&text).context(DecodeSnafu)?;
        Ok(parsed.into_outcome())
    }
}
