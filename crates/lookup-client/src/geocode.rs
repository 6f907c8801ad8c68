//! Geocoding client for the Google Geocoding API.

use crate::error::LookupError;
use crate::types::{Coordinates, Geocoder, ProviderOutcome};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default Google Maps API base URL.
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Address-to-coordinates client.
pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    /// Create a geocoder against the public Google endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        Self::with_base_url(api_key, GOOGLE_MAPS_BASE_URL, timeout)
    }

    /// Create a geocoder against a custom base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    /// Resolve `address` to the coordinates of the first match.
    #[instrument(skip(self))]
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, LookupError> {
        debug!("Sending geocoding request");

        let response = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", address), ("key", self.api_key.expose_secret().as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;

        Ok(parsed.results.into_iter().next().map(|r| Coordinates {
            lat: r.geometry.location.lat,
            lng: r.geometry.location.lng,
        }))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> ProviderOutcome<Coordinates> {
        let outcome = ProviderOutcome::from_result(self.lookup(address).await);
        match &outcome {
            ProviderOutcome::ProviderError(e) => warn!(error = %e, "Geocoding failed"),
            ProviderOutcome::Timeout => warn!("Geocoding timed out"),
            ProviderOutcome::NotFound => debug!(address, "No geocoding results"),
            ProviderOutcome::Found(_) => {}
        }
        outcome
    }
}
