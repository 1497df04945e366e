use serde::Serialize;

use crate::{config::LocationBias, models::place::LatLng};

/// Body of a `places:searchText` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest<'a> {
    pub text_query: &'a str,
    pub location_bias: LocationBiasBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationBiasBody {
    pub circle: Circle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Circle {
    pub center: LatLng,
    /// Meters.
    pub radius: f64,
}

impl<'a> SearchTextRequest<'a> {
    pub fn new(text_query: &'a str, bias: &LocationBias) -> Self {
        Self {
            text_query,
            location_bias: LocationBiasBody {
                circle: Circle {
                    center: LatLng {
                        latitude: bias.latitude,
                        longitude: bias.longitude,
                    },
                    radius: bias.radius_m,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_shape() {
        let body = SearchTextRequest::new("Revival PT Minneapolis MN", &LocationBias::default());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "textQuery": "Revival PT Minneapolis MN",
                "locationBias": {
                    "circle": {
                        "center": { "latitude": 44.9778, "longitude": -93.2650 },
                        "radius": 50000.0
                    }
                }
            })
        );
    }
}
