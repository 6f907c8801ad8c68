//! HTTP surface of the dashboard.

mod handlers;
mod middleware;
mod types;
mod views;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::lookup::LookupSettings;
use crate::session::require_login;
use crate::store::ConfigStore;
use axum::{
    extract::FromRef,
    handler::Handler,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use logo_generator::LogoGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persisted admin config
    pub store: Arc<ConfigStore>,
    /// Branding badge renderer
    pub logo: Arc<LogoGenerator>,
    /// Where the current logo lives
    pub logo_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Text used when the logo form omits one
    pub default_logo_text: String,
    /// Provider endpoints and credential fallbacks
    pub lookup: Arc<LookupSettings>,
    /// Cookie signing key
    pub session_key: Key,
    /// Lifetime of a login
    pub session_max_age: Duration,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

/// Create the router with the given login rate limit.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let protected = Router::new()
        .route(
            "/dashboard",
            get(handlers::dashboard_page).post(handlers::dashboard_lookup),
        )
        .route("/generate-logo", post(handlers::generate_logo))
        .route("/download-logo", get(handlers::download_logo))
        .route(
            "/settings",
            get(handlers::settings_page).post(handlers::settings_update),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_login,
        ));

    let login_submit = handlers::login_submit.layer(axum_middleware::from_fn_with_state(
        rate_limit,
        rate_limit_middleware,
    ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login_page).post(login_submit))
        .route("/logout", get(handlers::logout))
        .merge(protected)
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
