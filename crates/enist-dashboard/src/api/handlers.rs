//! HTTP request handlers.

use super::types::{HealthResponse, LoginForm, LoginQuery, LogoForm, LookupForm, SettingsForm};
use super::views::{
    flash_views, render, DashboardTemplate, LoginTemplate, ResultView, SettingsTemplate,
};
use super::AppState;
use crate::error::DashboardError;
use crate::password::{hash_password, verify_password};
use crate::session::{
    add_flash, is_logged_in, login_cookie, logout as end_session, safe_next, take_flashes,
    FlashLevel, FlashMessage,
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use logo_generator::truncate_text;
use tracing::{info, warn};

/// Attachment name offered by `/download-logo`.
const DOWNLOAD_FILENAME: &str = "TNEH_logo.png";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Send visitors to the dashboard or the login page.
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> Redirect {
    if is_logged_in(&jar, state.session_max_age, now()) {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.store.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        password_configured: config.password_configured(),
    })
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<LoginQuery>,
) -> Result<(SignedCookieJar, Response), DashboardError> {
    let logged_in = is_logged_in(&jar, state.session_max_age, now());
    let (jar, flashes) = take_flashes(jar);

    let page = render(&LoginTemplate {
        flashes: flash_views(flashes),
        logged_in,
        next: safe_next(query.next.as_deref()),
    })?;

    Ok((jar, page.into_response()))
}

/// Check the submitted password and open a session.
///
/// An unset hash rejects every password.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(SignedCookieJar, Response), DashboardError> {
    let config = state.store.snapshot().await;
    let next = safe_next(form.next.as_deref());

    let accepted = match config.password_hash.as_deref() {
        Some(hash) if !hash.is_empty() => {
            let hash = hash.to_string();
            let password = form.password;
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
        }
        _ => {
            warn!("Login attempted but no admin password is configured");
            false
        }
    };

    if !accepted {
        warn!("Failed login attempt");
        let (jar, mut flashes) = take_flashes(jar);
        flashes.push(FlashMessage {
            level: FlashLevel::Error,
            message: "Invalid password.".to_string(),
        });

        let page = render(&LoginTemplate {
            flashes: flash_views(flashes),
            logged_in: false,
            next,
        })?;
        return Ok((jar, (StatusCode::UNAUTHORIZED, page).into_response()));
    }

    info!("Admin logged in");
    let jar = jar.add(login_cookie(now()));
    let jar = add_flash(jar, FlashLevel::Success, "Logged in successfully.");
    Ok((jar, Redirect::to(&next).into_response()))
}

pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    info!("Admin logged out");
    let jar = add_flash(end_session(jar), FlashLevel::Info, "Logged out.");
    (jar, Redirect::to("/login"))
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response), DashboardError> {
    let (jar, flashes) = take_flashes(jar);

    let page = render(&DashboardTemplate {
        flashes: flash_views(flashes),
        logged_in: true,
        phone: String::new(),
        ip: String::new(),
        result: None,
        logo_available: logo_exists(&state).await,
        default_logo_text: state.default_logo_text.clone(),
    })?;

    Ok((jar, page.into_response()))
}

/// Run a phone/IP lookup and render the merged result.
pub async fn dashboard_lookup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LookupForm>,
) -> Result<(SignedCookieJar, Response), DashboardError> {
    let config = state.store.snapshot().await;
    let aggregator = state.lookup.aggregator(&config)?;

    let result = aggregator.lookup(&form.phone, &form.ip).await;
    info!(
        phone = result.phone.is_some(),
        ip = result.ip_info.is_some(),
        "Lookup completed"
    );

    let (jar, flashes) = take_flashes(jar);
    let page = render(&DashboardTemplate {
        flashes: flash_views(flashes),
        logged_in: true,
        phone: form.phone,
        ip: form.ip,
        result: Some(ResultView::from(&result)),
        logo_available: logo_exists(&state).await,
        default_logo_text: state.default_logo_text.clone(),
    })?;

    Ok((jar, page.into_response()))
}

/// Regenerate the branding logo.
pub async fn generate_logo(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LogoForm>,
) -> Result<(SignedCookieJar, Redirect), DashboardError> {
    let text = truncate_text(
        form.logo_text
            .as_deref()
            .unwrap_or(state.default_logo_text.as_str()),
    );

    let generator = state.logo.clone();
    let path = state.logo_path.clone();
    let rendered = text.clone();
    tokio::task::spawn_blocking(move || generator.generate(&rendered, &path)).await??;

    let jar = add_flash(jar, FlashLevel::Success, format!("Logo generated: {}", text));
    Ok((jar, Redirect::to("/dashboard")))
}

/// Serve the current logo as a download.
pub async fn download_logo(State(state): State<AppState>) -> Result<Response, DashboardError> {
    let bytes = match tokio::fs::read(&state.logo_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DashboardError::NotFound("logo has not been generated".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub async fn settings_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response), DashboardError> {
    let config = state.store.snapshot().await;
    let (jar, flashes) = take_flashes(jar);

    let page = render(&SettingsTemplate {
        flashes: flash_views(flashes),
        logged_in: true,
        google_maps_api_key: config.google_maps_api_key,
        ip_geolocation_api: config.ip_geolocation_api,
    })?;

    Ok((jar, page.into_response()))
}

/// Overwrite provider credentials and optionally rotate the password.
pub async fn settings_update(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SettingsForm>,
) -> Result<(SignedCookieJar, Redirect), DashboardError> {
    let maps_key = form.google_maps_api_key.trim().to_string();
    let ip_token = form.ip_geolocation_api.trim().to_string();
    let new_password = form.new_password.trim().to_string();

    let new_hash = if new_password.is_empty() {
        None
    } else {
        Some(tokio::task::spawn_blocking(move || hash_password(&new_password)).await??)
    };
    let password_rotated = new_hash.is_some();

    state
        .store
        .update(|config| {
            config.google_maps_api_key = maps_key;
            config.ip_geolocation_api = ip_token;
            if let Some(hash) = new_hash {
                config.password_hash = Some(hash);
            }
        })
        .await?;

    let mut jar = jar;
    if password_rotated {
        info!("Admin password updated");
        jar = add_flash(jar, FlashLevel::Success, "Password updated.");
    }
    info!("Settings saved");
    let jar = add_flash(jar, FlashLevel::Success, "Settings saved.");

    Ok((jar, Redirect::to("/settings")))
}

async fn logo_exists(state: &AppState) -> bool {
    tokio::fs::try_exists(&state.logo_path)
        .await
        .unwrap_or(false)
}
