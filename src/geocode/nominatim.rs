// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Nominatim HTTP geocoding client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{GeocodeCandidate, GeocodeProvider};
use crate::config::constants::providers;
use crate::errors::ProviderError;
use crate::geo::LatLon;

/// One place in a Nominatim search response.
///
/// Coordinates arrive as strings; candidates whose coordinates fail to parse
/// are skipped rather than failing the query.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    namedetails: Option<NameDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct NameDetails {
    #[serde(default)]
    name: Option<String>,
}

impl NominatimPlace {
    /// Canonical label: the place's own name when present, otherwise the
    /// leading segment of the display name.
    fn label(&self) -> String {
        if let Some(details) = &self.namedetails {
            if let Some(name) = &details.name {
                if !name.is_empty() {
                    return name.clone();
                }
            }
        }
        self.display_name
            .split(',')
            .next()
            .unwrap_or(&self.display_name)
            .trim()
            .to_owned()
    }

    fn into_candidate(self) -> Option<GeocodeCandidate> {
        let lat: f64 = self.lat.parse().ok()?;
        let lon: f64 = self.lon.parse().ok()?;
        let label = self.label();
        Some(GeocodeCandidate {
            label,
            position: LatLon::new(lat, lon),
        })
    }
}

/// Geocoding client for a Nominatim-compatible HTTP endpoint.
///
/// Sends the identifying User-Agent the public instance's usage policy
/// requires. Pacing is the caller's job ([`crate::limiter::RateLimiter`]);
/// this client performs exactly one request per [`search`] call.
///
/// [`search`]: GeocodeProvider::search
#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    /// Creates a client against the public Nominatim endpoint.
    pub fn new() -> Self {
        Self::with_base_url(providers::NOMINATIM_URL)
    }

    /// Creates a client against a custom Nominatim-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeProvider for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        debug!(query, "Geocoding query");

        let limit = providers::GEOCODE_CANDIDATE_LIMIT.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("countrycodes", providers::GEOCODE_COUNTRY_CODES),
                ("namedetails", "1"),
                ("limit", limit.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, providers::USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::http("geocoding request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status.as_u16(), body));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| ProviderError::http("decoding geocoding response", e))?;

        let total = places.len();
        let candidates: Vec<GeocodeCandidate> = places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect();

        if candidates.len() < total {
            warn!(
                query,
                dropped = total - candidates.len(),
                "Skipped candidates with unparsable coordinates"
            );
        }

        Ok(candidates)
    }
}
