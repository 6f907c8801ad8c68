//! Merges phone analysis, geocoding and IP geolocation into one result.

use crate::phone::analyze_phone;
use crate::types::{Geocoder, IpLocator, IpReport, LookupResult, PhoneReport, ProviderOutcome};
use std::net::IpAddr;
use tracing::{debug, info};

/// Runs one dashboard lookup.
///
/// The geocoder is optional and only present when a maps credential is
/// configured. Phone and IP halves are independent; neither can fail the
/// whole lookup.
pub struct LookupAggregator {
    geocoder: Option<Box<dyn Geocoder>>,
    ip_locator: Box<dyn IpLocator>,
}

impl LookupAggregator {
    /// Create an aggregator without geocoding.
    pub fn new(ip_locator: Box<dyn IpLocator>) -> Self {
        Self {
            geocoder: None,
            ip_locator,
        }
    }

    /// Enable geocoding of the derived region description.
    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn has_geocoder(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Look up `phone` and `ip`. Blank inputs are skipped.
    pub async fn lookup(&self, phone: &str, ip: &str) -> LookupResult {
        let phone = phone.trim();
        let ip = ip.trim();
        info!(
            has_phone = !phone.is_empty(),
            has_ip = !ip.is_empty(),
            "Running lookup"
        );

        let phone = if phone.is_empty() {
            None
        } else {
            Some(self.lookup_phone(phone).await)
        };

        let ip_info = if ip.is_empty() {
            None
        } else {
            Some(self.lookup_ip(ip).await)
        };

        LookupResult { phone, ip_info }
    }

    async fn lookup_phone(&self, raw: &str) -> PhoneReport {
        let details = match analyze_phone(raw) {
            Ok(details) => details,
            Err(e) => {
                debug!(error = %e, "Phone number rejected");
                return PhoneReport::Failed {
                    raw: raw.to_string(),
                    error: e.to_string(),
                };
            }
        };

        let coordinates = match &self.geocoder {
            Some(geocoder) if !details.country.is_empty() => {
                geocoder.geocode(&details.country).await.found()
            }
            _ => None,
        };

        PhoneReport::Parsed {
            raw: raw.to_string(),
            details,
            coordinates,
        }
    }

    async fn lookup_ip(&self, raw: &str) -> IpReport {
        let ip: IpAddr = match raw.parse() {
            Ok(ip) => ip,
            Err(_) => return IpReport::error(format!("Invalid IP address: {}", raw)),
        };

        match self.ip_locator.locate(ip).await {
            ProviderOutcome::Found(record) => IpReport::Record(record),
            ProviderOutcome::NotFound => IpReport::error(format!("No data for {}", ip)),
            ProviderOutcome::ProviderError(e) => IpReport::error(e),
            ProviderOutcome::Timeout => IpReport::error("Request timed out"),
        }
    }
}
