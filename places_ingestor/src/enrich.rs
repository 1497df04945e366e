//! Per-provider enrichment.
//!
//! [`EnrichmentRunner`] walks a provider list strictly in order, one lookup at
//! a time, and turns each provider into either an [`EnrichedRow`] or a
//! [`SkipReason`]. A skip never stops the batch: failures are isolated to the
//! provider that caused them, logged with its display name, and the runner
//! moves on. Only the successes become output rows, in input order.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    config::{QueryConfig, RetryConfig},
    models::{
        enriched::EnrichedRow,
        place::LookupOutcome,
        provider::ProviderRecord,
    },
    providers::{LookupError, PlaceLookup},
};

/// Builds the free-text query `"{name} {city} {region}"`.
///
/// Blank parts are left out, so the result never has stray spaces.
pub fn build_query(provider: &ProviderRecord, query: &QueryConfig) -> String {
    [
        provider.display_name.trim(),
        provider.city_or(&query.default_city),
        query.region_code.trim(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Why a provider produced no row.
#[derive(Debug)]
pub enum SkipReason {
    /// The search succeeded but returned no candidates.
    NotFound,
    /// The search failed (after any configured retries).
    Lookup(LookupError),
}

/// A provider that was left out of the output.
#[derive(Debug)]
pub struct SkippedProvider {
    pub provider_id: String,
    pub display_name: String,
    pub reason: SkipReason,
}

/// Result of one enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    /// Output rows in input order.
    pub rows: Vec<EnrichedRow>,
    /// Providers without a row, in input order.
    pub skipped: Vec<SkippedProvider>,
}

impl EnrichmentReport {
    /// Number of providers processed.
    pub fn attempted(&self) -> usize {
        self.rows.len() + self.skipped.len()
    }

    pub fn not_found(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::NotFound))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Lookup(_)))
            .count()
    }
}

/// Sequential enrichment over a [`PlaceLookup`].
pub struct EnrichmentRunner<'a, L: PlaceLookup + ?Sized> {
    lookup: &'a L,
    query: QueryConfig,
    retry: RetryConfig,
    run_date: NaiveDate,
}

impl<'a, L: PlaceLookup + ?Sized> EnrichmentRunner<'a, L> {
    pub fn new(lookup: &'a L, query: QueryConfig, retry: RetryConfig, run_date: NaiveDate) -> Self {
        Self {
            lookup,
            query,
            retry,
            run_date,
        }
    }

    /// Enriches a single provider.
    pub async fn enrich_one(&self, provider: &ProviderRecord) -> Result<EnrichedRow, SkipReason> {
        let query = build_query(provider, &self.query);
        match self.lookup_with_retry(&query).await {
            Ok(LookupOutcome::Found(place)) => {
                Ok(EnrichedRow::from_match(provider, place, self.run_date))
            }
            Ok(LookupOutcome::NotFound) => Err(SkipReason::NotFound),
            Err(e) => Err(SkipReason::Lookup(e)),
        }
    }

    /// Enriches every provider, in order, one at a time.
    pub async fn run(&self, providers: &[ProviderRecord]) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();

        for provider in providers {
            match self.enrich_one(provider).await {
                Ok(row) => report.rows.push(row),
                Err(reason) => {
                    match &reason {
                        SkipReason::NotFound => {
                            info!(provider = %provider.display_name, "no place found");
                        }
                        SkipReason::Lookup(e) => {
                            warn!(provider = %provider.display_name, error = %e, "lookup failed, skipping");
                        }
                    }
                    report.skipped.push(SkippedProvider {
                        provider_id: provider.provider_id.clone(),
                        display_name: provider.display_name.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            run_date = %self.run_date,
            providers = providers.len(),
            rows = report.rows.len(),
            not_found = report.not_found(),
            failed = report.failed(),
            "enrichment finished"
        );
        report
    }

    async fn lookup_with_retry(&self, query: &str) -> Result<LookupOutcome, LookupError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.lookup.lookup(query).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(query, attempt, ?delay, error = %e, "retrying lookup");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
