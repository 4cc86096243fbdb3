// Best-effort IP → region lookup. A lookup never fails: every error path
// degrades to a label derived from the IP itself.

pub use ipinfo::IpInfoLocator;

mod ipinfo;

use async_trait::async_trait;
use std::net::IpAddr;

pub const LOCAL_NETWORK_LABEL: &str = "Local network";
pub const UNKNOWN_REGION_LABEL: &str = "Unknown region";

#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Returns a human-readable region for `ip`
    async fn locate(&self, ip: &str) -> String;
}

/// Label for loopback/private addresses, which have no public location
pub fn local_label(ip: &str) -> Option<&'static str> {
    if ip.eq_ignore_ascii_case("localhost") {
        return Some(LOCAL_NETWORK_LABEL);
    }

    let is_local = match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => {
            v6.is_loopback()
                || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback() || v4.is_private())
                // fc00::/7 unique local, fe80::/10 link local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
        Err(_) => false,
    };

    is_local.then_some(LOCAL_NETWORK_LABEL)
}

/// Label used when a public address cannot be resolved
pub fn fallback_label(ip: &str) -> String {
    format!("IP: {}", ip)
}

/// Locator that never leaves the process: local addresses get the local
/// label and everything else the IP fallback
#[derive(Debug, Default)]
pub struct StaticGeoLocator;

impl StaticGeoLocator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GeoLocator for StaticGeoLocator {
    async fn locate(&self, ip: &str) -> String {
        local_label(ip)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_label(ip))
    }
}
