use std::env;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ELEMENTS: usize = 20;
const FALLBACK_NAME: &str = "Unnamed Restaurant";

#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(default)]
    tags: Tags,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
}

#[derive(Debug, Deserialize, Default)]
struct Tags {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

/// Client for the public map-data service. Every failure mode — network,
/// timeout, non-200, malformed body — degrades to an empty result; callers
/// never see a lookup error.
#[derive(Clone)]
pub struct VenueLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl VenueLookup {
    pub fn new() -> Self {
        let endpoint = env::var("VENUE_LOOKUP_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .expect("Failed to build lookup client");
        Self { client, endpoint }
    }

    pub async fn search(&self, city: &str) -> Vec<Venue> {
        let query = format!(
            r#"[out:json];
area["name"="{city}"]->.searchArea;
(
  node["amenity"="restaurant"](area.searchArea);
  way["amenity"="restaurant"](area.searchArea);
  relation["amenity"="restaurant"](area.searchArea);
);
out center {MAX_ELEMENTS};"#
        );

        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[("data", query.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%city, error = %err, "venue lookup request failed");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            tracing::warn!(%city, status = %response.status(), "venue lookup returned an error status");
            return Vec::new();
        }
        match response.json::<LookupResponse>().await {
            Ok(body) => decode_venues(body),
            Err(err) => {
                tracing::warn!(%city, error = %err, "venue lookup body was not decodable");
                Vec::new()
            }
        }
    }
}

impl Default for VenueLookup {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn decode_venues(body: LookupResponse) -> Vec<Venue> {
    body.elements
        .into_iter()
        .take(MAX_ELEMENTS)
        .filter_map(|element| {
            let (lat, lon) = match (element.lat, element.lon, element.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(center)) => (center.lat, center.lon),
                _ => return None,
            };
            Some(Venue {
                name: element
                    .tags
                    .name
                    .unwrap_or_else(|| FALLBACK_NAME.to_string()),
                lat,
                lon,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: serde_json::Value) -> Vec<Venue> {
        decode_venues(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn decodes_nodes_and_centered_ways() {
        let venues = decode(serde_json::json!({
            "elements": [
                {"type": "node", "lat": 18.52, "lon": 73.85, "tags": {"name": "Cafe One"}},
                {"type": "way", "center": {"lat": 18.53, "lon": 73.86}, "tags": {"name": "Cafe Two"}},
            ]
        }));
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].name, "Cafe One");
        assert_eq!(venues[1].lat, 18.53);
    }

    #[test]
    fn skips_elements_without_coordinates() {
        let venues = decode(serde_json::json!({
            "elements": [
                {"type": "relation", "tags": {"name": "No Coordinates"}},
                {"type": "node", "lat": 18.52, "lon": 73.85, "tags": {"name": "Kept"}},
            ]
        }));
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "Kept");
    }

    #[test]
    fn nameless_venues_get_the_fallback_name() {
        let venues = decode(serde_json::json!({
            "elements": [{"type": "node", "lat": 18.52, "lon": 73.85}]
        }));
        assert_eq!(venues[0].name, FALLBACK_NAME);
    }

    #[test]
    fn result_is_bounded() {
        let elements: Vec<_> = (0..40)
            .map(|i| serde_json::json!({"type": "node", "lat": 18.0 + i as f64, "lon": 73.0}))
            .collect();
        let venues = decode(serde_json::json!({ "elements": elements }));
        assert_eq!(venues.len(), MAX_ELEMENTS);
    }

    #[test]
    fn empty_or_alien_body_is_harmless() {
        assert!(decode(serde_json::json!({})).is_empty());
        assert!(decode(serde_json::json!({"elements": []})).is_empty());
    }
}
