//! ENIST dashboard - single-admin phone and IP lookup service.
//!
//! The dashboard:
//! - Keeps its admin password hash and provider credentials in a JSON file
//! - Bootstraps the admin password on first start
//! - Gates every page behind a signed session cookie
//! - Runs phone/IP lookups and renders the branding logo

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod lookup;
pub mod password;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::DashboardError;
pub use store::{AdminConfig, ConfigStore};
