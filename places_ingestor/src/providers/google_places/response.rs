use serde::Deserialize;
use tracing::debug;

use crate::models::place::{LatLng, LookupOutcome, PlaceMatch, RATING_RANGE};

/// Body of a `places:searchText` response. An empty result set comes back as `{}`.
#[derive(Deserialize, Debug, Default)]
pub struct SearchTextResponse {
    /// `null` entries are kept so that a null first candidate reads as no match.
    #[serde(default)]
    pub places: Option<Vec<Option<PlaceResult>>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResult {
    pub id: Option<String>,
    pub display_name: Option<LocalizedText>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub location: Option<LatLng>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    pub text: Option<String>,
    pub language_code: Option<String>,
}

impl SearchTextResponse {
    /// Picks the first (API-ranked) candidate. No secondary scoring.
    pub fn into_outcome(self) -> LookupOutcome {
        match self.places.and_then(|places| places.into_iter().next().flatten()) {
            Some(place) => LookupOutcome::Found(place.into()),
            None => LookupOutcome::NotFound,
        }
    }
}

impl From<PlaceResult> for PlaceMatch {
    fn from(place: PlaceResult) -> Self {
        let rating = place.rating.filter(|r| {
            let ok = RATING_RANGE.contains(r);
            if !ok {
                debug!(rating = r, place_id = ?place.id, "discarding out-of-range rating");
            }
            ok
        });
        Self {
            place_id: place.id,
            display_name: place.display_name.and_then(|t| t.text),
            rating,
            review_count: place.user_rating_count,
            location: place.location,
        }
    }
}
