use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

pub const UNKNOWN_ORIGIN: &str = "Unknown";

/// Client network origin of a request: best-effort IP and user agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin {
    pub ip: String,
    pub user_agent: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(UNKNOWN_ORIGIN)
            .to_string();

        Ok(Self {
            ip: resolve_client_ip(&parts.headers, peer),
            user_agent,
        })
    }
}

/// Picks the client IP from proxy headers before falling back to the peer address.
///
/// Order: first `X-Forwarded-For` hop, `X-Real-IP`, `for=` of the first
/// `Forwarded` element, then the connection address.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let forwarded_for = header_value("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let candidate = forwarded_for
        .or_else(|| header_value("x-real-ip"))
        .or_else(|| header_value("forwarded").and_then(forwarded_for_directive));

    match candidate {
        Some(raw) => strip_port(raw),
        None => peer
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string()),
    }
}

/// Extracts the `for=` value from the first element of a `Forwarded` header
fn forwarded_for_directive(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, val) = pair.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("for")
                .then(|| val.trim().trim_matches('"'))
        })
        .filter(|val| !val.is_empty())
}

/// Removes a port suffix while leaving bare IPv6 addresses intact
pub fn strip_port(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(ip) = raw.parse::<IpAddr>() {
        return ip.to_string();
    }
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|rest| rest.split(']').next()) {
        return inner.to_string();
    }
    match raw.split_once(':') {
        Some((host, _port)) if !host.is_empty() => host.to_string(),
        _ => raw.to_string(),
    }
}
