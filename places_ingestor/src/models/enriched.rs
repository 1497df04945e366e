//! Output rows of the ratings dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{place::PlaceMatch, provider::ProviderRecord};

/// Provenance tag written into every row.
pub const RATING_SOURCE: &str = "google_places_v1";

/// Fixed column order of the ratings artifact.
pub const RATINGS_COLUMNS: [&str; 6] = [
    "provider_id",
    "rating",
    "reviews_count",
    "rating_source",
    "places_id",
    "fetched_at",
];

/// One provider joined with its place match.
///
/// `fetched_at` is the run's logical date so that re-running a day produces
/// identical rows. Field order matches [`RATINGS_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub provider_id: String,
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
    pub rating_source: String,
    pub places_id: Option<String>,
    pub fetched_at: NaiveDate,
}

impl EnrichedRow {
    pub fn from_match(provider: &ProviderRecord, place: PlaceMatch, run_date: NaiveDate) -> Self {
        Self {
            provider_id: provider.provider_id.clone(),
            rating: place.rating,
            reviews_count: place.review_count,
            rating_source: RATING_SOURCE.to_string(),
            places_id: place.place_id,
            fetched_at: run_date,
        }
    }
}
