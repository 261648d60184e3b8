//! Client identification and rate-limit enforcement.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::rate_limit::Decision;

/// Key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address.
///
/// Resolution order: first entry of `X-Forwarded-For`, then `X-Real-IP`,
/// then the socket peer address, then `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    /// Resolves the client address from headers and the optional peer.
    #[must_use]
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = header_value(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let ip = forwarded
            .or_else(|| header_value(headers, "x-real-ip"))
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        Self(ip)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::resolve(&parts.headers, peer))
    }
}

/// Rejects requests from clients over their quota with 429.
///
/// # Errors
///
/// Returns [`GatewayError::RateLimited`] when the client is over quota.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    match state.rate_limiter.check(&client_ip).await {
        Decision::Allowed { .. } => Ok(next.run(request).await),
        Decision::Limited { retry_after } => {
            let quota = state.rate_limiter.quota();
            tracing::warn!(%client_ip, path = %request.uri().path(), "rate limit exceeded");
            Err(GatewayError::RateLimited {
                max_requests: quota.max_requests(),
                window_secs: quota.window().as_secs(),
                retry_after_ms: u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(ClientIp::resolve(&h, None).0, "203.0.113.7");
    }

    #[test]
    fn real_ip_is_second_choice() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(ClientIp::resolve(&h, None).0, "198.51.100.2");
    }

    #[test]
    fn peer_address_is_used_without_headers() {
        let peer = SocketAddr::from(([192, 0, 2, 9], 5555));
        assert_eq!(ClientIp::resolve(&HeaderMap::new(), Some(peer)).0, "192.0.2.9");
    }

    #[test]
    fn blank_headers_fall_through_to_unknown() {
        let h = headers(&[("x-forwarded-for", " , "), ("x-real-ip", " ")]);
        assert_eq!(ClientIp::resolve(&h, None).0, UNKNOWN_CLIENT);
    }
}
