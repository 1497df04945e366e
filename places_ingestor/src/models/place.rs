//! Normalized result of a place search.

use serde::{Deserialize, Serialize};

/// Inclusive bounds for a place rating.
pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Best-match place for a query.
///
/// Every field is optional: upstream may omit any of them, and an absent
/// rating means "unknown", not zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceMatch {
    /// External place identifier.
    pub place_id: Option<String>,
    pub display_name: Option<String>,
    /// Rating within [`RATING_RANGE`].
    pub rating: Option<f64>,
    /// Number of user reviews behind `rating`.
    pub review_count: Option<u64>,
    pub location: Option<LatLng>,
}

/// Outcome of a successful lookup call.
///
/// `NotFound` is a valid answer, distinct from a failed lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(PlaceMatch),
    NotFound,
}

impl LookupOutcome {
    pub fn into_match(self) -> Option<PlaceMatch> {
        match self {
            Self::Found(m) => Some(m),
            Self::NotFound => None,
        }
    }
}
