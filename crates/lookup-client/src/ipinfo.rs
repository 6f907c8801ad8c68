//! IP geolocation client for the ipinfo.io API.

use crate::error::LookupError;
use crate::types::{IpLocator, IpRecord, ProviderOutcome};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default ipinfo.io base URL.
pub const IPINFO_BASE_URL: &str = "https://ipinfo.io";

/// IP-to-location client.
///
/// The token is optional: ipinfo answers anonymous requests with a lower
/// rate limit.
pub struct IpInfoClient {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl IpInfoClient {
    /// Create a client against the public ipinfo endpoint.
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        Self::with_base_url(token, IPINFO_BASE_URL, timeout)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(
        token: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()).map(SecretString::new),
        })
    }

    /// Fetch the provider record for `ip`.
    #[instrument(skip(self), fields(authenticated = self.token.is_some()))]
    pub async fn lookup(&self, ip: IpAddr) -> Result<Option<IpRecord>, LookupError> {
        let url = format!("{}/{}/json", self.base_url, ip);
        debug!(url = %url, "Sending IP lookup request");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;

        match value {
            serde_json::Value::Object(record) if record.is_empty() => Ok(None),
            serde_json::Value::Object(record) => Ok(Some(record)),
            other => Err(LookupError::InvalidInput(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl IpLocator for IpInfoClient {
    async fn locate(&self, ip: IpAddr) -> ProviderOutcome<IpRecord> {
        let outcome = ProviderOutcome::from_result(self.lookup(ip).await);
        match &outcome {
            ProviderOutcome::ProviderError(e) => warn!(%ip, error = %e, "IP lookup failed"),
            ProviderOutcome::Timeout => warn!(%ip, "IP lookup timed out"),
            _ => {}
        }
        outcome
    }
}
