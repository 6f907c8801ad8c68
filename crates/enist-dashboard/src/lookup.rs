//! Wiring of provider credentials into a [`LookupAggregator`].

use crate::config::Config;
use crate::error::DashboardError;
use crate::store::AdminConfig;
use lookup_client::{GoogleGeocoder, IpInfoClient, LookupAggregator};
use std::time::Duration;
use tracing::debug;

/// Provider endpoints plus the env-level credential fallbacks.
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub geocode_url: String,
    pub ipinfo_url: String,
    pub timeout: Duration,
    pub maps_key_fallback: Option<String>,
    pub ipinfo_token_fallback: Option<String>,
}

impl LookupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            geocode_url: config.lookup.geocode_url.clone(),
            ipinfo_url: config.lookup.ipinfo_url.clone(),
            timeout: config.lookup.timeout,
            maps_key_fallback: config.google_maps_key.clone(),
            ipinfo_token_fallback: config.ipinfo_token.clone(),
        }
    }

    /// Maps key in effect: the stored one, else the env one.
    pub fn maps_key(&self, admin: &AdminConfig) -> Option<String> {
        pick(&admin.google_maps_api_key, self.maps_key_fallback.as_deref())
    }

    /// IP lookup token in effect: the stored one, else the env one.
    pub fn ipinfo_token(&self, admin: &AdminConfig) -> Option<String> {
        pick(&admin.ip_geolocation_api, self.ipinfo_token_fallback.as_deref())
    }

    /// Build an aggregator for the credentials currently stored.
    pub fn aggregator(&self, admin: &AdminConfig) -> Result<LookupAggregator, DashboardError> {
        let ip_locator =
            IpInfoClient::with_base_url(self.ipinfo_token(admin), &self.ipinfo_url, self.timeout)?;
        let mut aggregator = LookupAggregator::new(Box::new(ip_locator));

        match self.maps_key(admin) {
            Some(key) => {
                let geocoder = GoogleGeocoder::with_base_url(key, &self.geocode_url, self.timeout)?;
                aggregator = aggregator.with_geocoder(Box::new(geocoder));
            }
            None => debug!("No maps key configured, skipping geocoding"),
        }

        Ok(aggregator)
    }
}

fn pick(stored: &str, fallback: Option<&str>) -> Option<String> {
    let stored = stored.trim();
    if !stored.is_empty() {
        return Some(stored.to_string());
    }
    fallback
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(maps: Option<&str>, token: Option<&str>) -> LookupSettings {
        LookupSettings {
            geocode_url: "http://127.0.0.1:9".into(),
            ipinfo_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(1),
            maps_key_fallback: maps.map(String::from),
            ipinfo_token_fallback: token.map(String::from),
        }
    }

    #[test]
    fn test_stored_credentials_win() {
        let admin = AdminConfig {
            google_maps_api_key: "stored-key".into(),
            ip_geolocation_api: " stored-token ".into(),
            ..AdminConfig::default()
        };
        let settings = settings(Some("env-key"), Some("env-token"));

        assert_eq!(settings.maps_key(&admin).as_deref(), Some("stored-key"));
        assert_eq!(settings.ipinfo_token(&admin).as_deref(), Some("stored-token"));
    }

    #[test]
    fn test_env_fills_blank_store() {
        let settings = settings(Some("env-key"), Some(""));
        let admin = AdminConfig::default();

        assert_eq!(settings.maps_key(&admin).as_deref(), Some("env-key"));
        assert_eq!(settings.ipinfo_token(&admin), None);
    }

    #[test]
    fn test_no_maps_key_means_no_geocoder() {
        let aggregator = settings(None, None)
            .aggregator(&AdminConfig::default())
            .unwrap();
        assert!(!aggregator.has_geocoder());

        let admin = AdminConfig {
            google_maps_api_key: "k".into(),
            ..AdminConfig::default()
        };
        let aggregator = settings(None, None).aggregator(&admin).unwrap();
        assert!(aggregator.has_geocoder());
    }
}
