//! Form payloads and JSON responses.

use serde::{Deserialize, Serialize};

/// Query string of `GET /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// `POST /login` form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// `POST /dashboard` form. Both fields may be blank.
#[derive(Debug, Default, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub ip: String,
}

/// `POST /generate-logo` form.
#[derive(Debug, Default, Deserialize)]
pub struct LogoForm {
    /// Missing means the default text; present-but-empty is kept as is
    pub logo_text: Option<String>,
}

/// `POST /settings` form.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub google_maps_api_key: String,
    #[serde(default)]
    pub ip_geolocation_api: String,
    #[serde(default)]
    pub new_password: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub password_configured: bool,
}
