//! Rate limiting and request logging middleware.

use crate::error::DashboardError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};
use tracing::{debug, warn};

/// Login limiter keyed by peer address.
pub type PeerLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Tracked peers before stale entries are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Key used when the connection carries no peer address.
const UNKNOWN_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Login attempt limiter shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    pub per_peer: Arc<PeerLimiter>,
}

impl RateLimitState {
    /// Allow `requests_per_minute` login attempts per peer; zero is treated as one.
    pub fn new(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            per_peer: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(1000)
    }

    /// Spend one attempt from `peer`'s quota.
    pub fn check(&self, peer: IpAddr) -> bool {
        if self.per_peer.len() > SWEEP_THRESHOLD {
            self.per_peer.retain_recent();
        }
        self.per_peer.check_key(&peer).is_ok()
    }
}

/// Returns 429 Too Many Requests once the peer's login quota is spent.
///
/// Requests served without connect info share one bucket.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, DashboardError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(UNKNOWN_PEER);

    if !rate_limit.check(peer) {
        warn!(%peer, "Login rate limit exceeded");
        return Err(DashboardError::RateLimitExceeded);
    }

    debug!(%peer, "Rate limit check passed");
    Ok(next.run(request).await)
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    debug!(%method, %path, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        debug!(%method, %path, %status, ?duration, "Request completed");
    } else {
        warn!(%method, %path, %status, ?duration, "Request failed");
    }

    response
}
