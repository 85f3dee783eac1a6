//! Fixed-window request limits backed by Redis.
//!
//! Each rule counts requests per origin in a key that expires with the window.
//! When Redis is unreachable the request is let through and a warning logged.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use deadpool_redis::Pool;
use deadpool_redis::redis;
use tracing::{info, warn};

use crate::domain::repository::RateLimiter;
use crate::domain::types::RateDecision;
use crate::error::SiteError;
use crate::state::AppState;

#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

/// `INCR` and `EXPIRE .. NX` in one `MULTI`. A key never outlives its window,
/// and a key left without a TTL gets one on its next hit.
fn window_pipeline(key: &str, window_secs: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1u64)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_secs)
        .arg("NX")
        .ignore();
    pipe
}

impl RateLimiter for RedisRateLimiter {
    async fn hit(
        &self,
        key: &str,
        limit: u64,
        window_secs: u64,
    ) -> Result<RateDecision, SiteError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SiteError::Internal(e.into()))?;
        let (count,): (u64,) = window_pipeline(key, window_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| SiteError::Internal(e.into()))?;
        Ok(if count > limit {
            RateDecision::Limited
        } else {
            RateDecision::Allowed
        })
    }
}

/// A named limit: at most `limit` requests per origin every `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub name: &'static str,
    pub limit: u64,
    pub window_secs: u64,
}

/// Contact submissions: 3 per hour.
pub const CONTACTS: RateLimitRule = RateLimitRule {
    name: "contacts",
    limit: 3,
    window_secs: 60 * 60,
};

/// Registrations: 10 per 3 minutes.
pub const REGISTRATIONS: RateLimitRule = RateLimitRule {
    name: "registrations",
    limit: 10,
    window_secs: 3 * 60,
};

/// Client address for rate limiting.
///
/// `x-forwarded-for` is only read when the peer is a trusted proxy. The list is
/// walked from the right and the first hop not in `trusted_proxies` wins, so
/// values prepended by the client are never used.
pub fn client_origin(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = peer.map(|addr| addr.ip()) else {
        return "unknown".to_owned();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }
    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();
    hops.iter()
        .rev()
        .filter_map(|hop| hop.parse::<IpAddr>().ok())
        .find(|ip| !trusted_proxies.contains(ip))
        .unwrap_or(peer)
        .to_string()
}

pub async fn enforce<L: RateLimiter>(
    limiter: &L,
    rule: RateLimitRule,
    origin: &str,
) -> Result<(), SiteError> {
    let key = format!("rate_limit:{}:{}", rule.name, origin);
    match limiter.hit(&key, rule.limit, rule.window_secs).await {
        Ok(RateDecision::Allowed) => Ok(()),
        Ok(RateDecision::Limited) => {
            info!(rule = rule.name, origin, "rate limit exceeded");
            Err(SiteError::RateLimited)
        }
        Err(e) => {
            warn!(error = ?e, rule = rule.name, "rate limiter unavailable, allowing request");
            Ok(())
        }
    }
}

async fn limit(
    state: &AppState,
    rule: RateLimitRule,
    request: Request,
    next: Next,
) -> Result<Response, SiteError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let origin = client_origin(request.headers(), peer, &state.config.trusted_proxies);
    enforce(&state.rate_limiter(), rule, &origin).await?;
    Ok(next.run(request).await)
}

pub async fn limit_contacts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, SiteError> {
    limit(&state, CONTACTS, request, next).await
}

pub async fn limit_registrations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, SiteError> {
    limit(&state, REGISTRATIONS, request, next).await
}
