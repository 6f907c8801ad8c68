//! Error types for the dashboard.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Dashboard error types.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Logo error: {0}")]
    Logo(#[from] logo_generator::LogoError),

    #[error("Lookup setup error: {0}")]
    Lookup(#[from] lookup_client::LookupError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            DashboardError::Config(_)
            | DashboardError::Storage(_)
            | DashboardError::Password(_)
            | DashboardError::Logo(_)
            | DashboardError::Lookup(_)
            | DashboardError::Template(_)
            | DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, self.to_string()).into_response()
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

impl From<tokio::task::JoinError> for DashboardError {
    fn from(e: tokio::task::JoinError) -> Self {
        DashboardError::Internal(format!("Background task failed: {}", e))
    }
}
