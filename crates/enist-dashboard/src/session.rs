//! Signed session cookie, flash messages and the login gate.

use crate::api::AppState;
use crate::error::DashboardError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SESSION_COOKIE: &str = "enist_session";
pub const FLASH_COOKIE: &str = "enist_flash";

/// Length of the signing key material.
const KEY_LEN: usize = 64;

/// Build the cookie-signing key.
///
/// A configured secret is stretched with SHA-512. Without one, a random key
/// is generated once and kept hex-encoded at `key_path` so sessions survive
/// restarts.
pub async fn load_or_create_key(
    secret: Option<&str>,
    key_path: &Path,
) -> Result<Key, DashboardError> {
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        debug!("Deriving session key from ENIST_SECRET_KEY");
        let digest = Sha512::digest(secret.as_bytes());
        return Ok(Key::from(digest.as_slice()));
    }

    if tokio::fs::try_exists(key_path).await? {
        let encoded = tokio::fs::read_to_string(key_path).await?;
        let bytes = hex::decode(encoded.trim()).map_err(|e| {
            DashboardError::Config(format!("{} is not hex: {}", key_path.display(), e))
        })?;
        if bytes.len() != KEY_LEN {
            return Err(DashboardError::Config(format!(
                "{} holds {} bytes, expected {}",
                key_path.display(),
                bytes.len(),
                KEY_LEN
            )));
        }
        debug!(path = %key_path.display(), "Loaded session key");
        return Ok(Key::from(bytes.as_slice()));
    }

    let mut bytes = [0u8; KEY_LEN];
    rand::rngs::OsRng.fill_bytes(&mut bytes);

    if let Some(parent) = key_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(key_path, hex::encode(bytes)).await?;
    info!(path = %key_path.display(), "Generated new session key");

    Ok(Key::from(&bytes[..]))
}

/// Session cookie recording a login at `now` (unix seconds).
pub fn login_cookie(now: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, now.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn logout(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Whether the jar carries a verified session younger than `max_age`.
pub fn is_logged_in(jar: &SignedCookieJar, max_age: Duration, now: i64) -> bool {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return false;
    };

    let Ok(issued) = cookie.value().parse::<i64>() else {
        return false;
    };

    match now.checked_sub(issued) {
        Some(age) if age >= 0 => (age as u64) < max_age.as_secs(),
        _ => false,
    }
}

/// Local path to continue to after login.
///
/// Anything that is not a same-origin absolute path falls back to the
/// dashboard.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/dashboard".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

fn read_flashes(jar: &SignedCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| {
            let decoded = urlencoding::decode(cookie.value()).ok()?;
            serde_json::from_str(&decoded).ok()
        })
        .unwrap_or_default()
}

/// Queue a flash message for the next page.
pub fn add_flash(
    jar: SignedCookieJar,
    level: FlashLevel,
    message: impl Into<String>,
) -> SignedCookieJar {
    let mut messages = read_flashes(&jar);
    messages.push(FlashMessage {
        level,
        message: message.into(),
    });

    let json = match serde_json::to_string(&messages) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Dropping flash message");
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Drain queued flash messages.
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    let messages = read_flashes(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

/// Redirects to `/login?next=...` unless the request carries a live session.
pub async fn require_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    if is_logged_in(&jar, state.session_max_age, chrono::Utc::now().timestamp()) {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/dashboard");

    debug!(path = %target, "Unauthenticated request redirected to login");

    let jar = add_flash(jar, FlashLevel::Info, "Login required.");
    let location = format!("/login?next={}", urlencoding::encode(target));
    (jar, Redirect::to(&location)).into_response()
}
