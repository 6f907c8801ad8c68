//! Lookup result types and provider seams.

use crate::error::LookupError;
use crate::phone::PhoneDetails;
use async_trait::async_trait;
use serde::Serialize;
use std::net::IpAddr;

/// Record returned by the IP geolocation provider, kept as-is.
pub type IpRecord = serde_json::Map<String, serde_json::Value>;

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of a single best-effort provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome<T> {
    /// Provider answered with usable data.
    Found(T),
    /// Provider answered but had nothing for the query.
    NotFound,
    /// Request failed, was rejected, or the body was malformed.
    ProviderError(String),
    /// Request did not finish in time.
    Timeout,
}

impl<T> ProviderOutcome<T> {
    /// Fold a client result into an outcome.
    pub fn from_result(result: Result<Option<T>, LookupError>) -> Self {
        match result {
            Ok(Some(value)) => ProviderOutcome::Found(value),
            Ok(None) => ProviderOutcome::NotFound,
            Err(LookupError::Timeout) => ProviderOutcome::Timeout,
            Err(e) => ProviderOutcome::ProviderError(e.to_string()),
        }
    }

    /// The data, if any.
    pub fn found(self) -> Option<T> {
        match self {
            ProviderOutcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Geocoding seam: place description to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> ProviderOutcome<Coordinates>;
}

/// IP geolocation seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate(&self, ip: IpAddr) -> ProviderOutcome<IpRecord>;
}

/// Phone half of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PhoneReport {
    Parsed {
        raw: String,
        #[serde(flatten)]
        details: PhoneDetails,
        coordinates: Option<Coordinates>,
    },
    Failed {
        raw: String,
        error: String,
    },
}

impl PhoneReport {
    /// The phone input as submitted.
    pub fn raw(&self) -> &str {
        match self {
            PhoneReport::Parsed { raw, .. } | PhoneReport::Failed { raw, .. } => raw,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PhoneReport::Failed { error, .. } => Some(error),
            PhoneReport::Parsed { .. } => None,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            PhoneReport::Parsed { coordinates, .. } => *coordinates,
            PhoneReport::Failed { .. } => None,
        }
    }
}

/// IP half of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IpReport {
    Record(IpRecord),
    Error { error: String },
}

impl IpReport {
    pub fn error(message: impl Into<String>) -> Self {
        IpReport::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, IpReport::Error { .. })
    }
}

/// Merged result of one dashboard lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupResult {
    pub phone: Option<PhoneReport>,
    pub ip_info: Option<IpReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let found: ProviderOutcome<u8> = ProviderOutcome::from_result(Ok(Some(1)));
        assert_eq!(found, ProviderOutcome::Found(1));

        let empty: ProviderOutcome<u8> = ProviderOutcome::from_result(Ok(None));
        assert_eq!(empty, ProviderOutcome::NotFound);

        let timeout: ProviderOutcome<u8> = ProviderOutcome::from_result(Err(LookupError::Timeout));
        assert_eq!(timeout, ProviderOutcome::Timeout);

        let failed: ProviderOutcome<u8> = ProviderOutcome::from_result(Err(
            LookupError::Provider {
                status: 500,
                body: "boom".into(),
            },
        ));
        assert_eq!(
            failed,
            ProviderOutcome::ProviderError("Provider returned 500: boom".into())
        );
        assert!(failed.found().is_none());
    }

    #[test]
    fn test_ip_error_serializes_as_error_object() {
        let json = serde_json::to_value(IpReport::error("unreachable")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "unreachable" }));
    }

    #[test]
    fn test_failed_phone_report_serialization() {
        let report = PhoneReport::Failed {
            raw: "abc".into(),
            error: "Phone parse error: not a number".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["raw"], "abc");
        assert_eq!(report.raw(), "abc");
        assert!(report.coordinates().is_none());
    }
}
