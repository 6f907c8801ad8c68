//! Runtime configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Dashboard configuration.
///
/// Every field maps to an `ENIST_` variable, with `__` separating nested
/// sections (e.g. `ENIST_SERVER__PORT`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding config.json, the session key and static files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Plaintext password used once to seed the admin hash
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Geocoding key used when the stored one is blank
    #[serde(default)]
    pub google_maps_key: Option<String>,

    /// IP lookup token used when the stored one is blank
    #[serde(default)]
    pub ipinfo_token: Option<String>,

    /// Session-signing secret; generated and persisted when unset
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Lookup provider configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Branding configuration
    #[serde(default)]
    pub branding: BrandingConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Timeout for each provider request
    #[serde(default = "default_lookup_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Geocoding API base URL
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// IP geolocation API base URL
    #[serde(default = "default_ipinfo_url")]
    pub ipinfo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long a login stays valid
    #[serde(default = "default_session_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Login attempts accepted per minute
    #[serde(default = "default_login_rpm")]
    pub login_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingConfig {
    /// Logo text used when no logo exists at startup
    #[serde(default = "default_logo_text")]
    pub default_text: String,

    /// Font tried before the built-in candidates
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            admin_password: None,
            google_maps_key: None,
            ipinfo_token: None,
            secret_key: None,
            server: ServerConfig::default(),
            lookup: LookupConfig::default(),
            session: SessionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            branding: BrandingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout: default_lookup_timeout(),
            geocode_url: default_geocode_url(),
            ipinfo_url: default_ipinfo_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age: default_session_max_age(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_minute: default_login_rpm(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            default_text: default_logo_text(),
            font_path: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_lookup_timeout() -> Duration {
    lookup_client::DEFAULT_TIMEOUT
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com".into()
}

fn default_ipinfo_url() -> String {
    "https://ipinfo.io".into()
}

fn default_session_max_age() -> Duration {
    Duration::from_secs(12 * 60 * 60) // 12 hours
}

fn default_login_rpm() -> u32 {
    10
}

fn default_logo_text() -> String {
    "TNEH".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("ENIST")
                    .prefix_separator("_")
                    .separator("__")
                    // numeric-looking passwords and tokens stay strings
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Path of the persisted admin config document.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Path of the generated session-signing key.
    pub fn session_key_path(&self) -> PathBuf {
        self.data_dir.join("session.key")
    }

    /// Directory served under `/static`.
    pub fn static_dir(&self) -> PathBuf {
        self.data_dir.join("static")
    }

    /// Path of the branding image.
    pub fn logo_path(&self) -> PathBuf {
        self.static_dir().join("logo.png")
    }
}
