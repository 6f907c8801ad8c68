//! Phone number and IP address lookups for the ENIST dashboard.
//!
//! Phone numbers are analysed locally; the derived region can be geocoded
//! through a Google-compatible API and IP addresses are resolved through an
//! ipinfo-compatible API. Provider failures never fail a lookup, they only
//! leave the corresponding part of the result empty or marked.

mod aggregator;
mod error;
mod geocode;
mod ipinfo;
mod phone;
mod timezones;
mod types;

pub use aggregator::LookupAggregator;
pub use error::LookupError;
pub use geocode::GoogleGeocoder;
pub use ipinfo::IpInfoClient;
pub use phone::{analyze_phone, PhoneDetails};
pub use types::*;

/// Timeout applied to every outbound provider call unless overridden.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(8);
